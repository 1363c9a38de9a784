//! Counterfactual inference: abduction, action, prediction.
//!
//! Abduction inverts each equation against the observed world to recover
//! its noise term, which is only possible for exogenous and additive
//! mechanisms. Action mutilates the model with the intervention.
//! Prediction replays the mutilated model under the recovered noise.

use super::assignment::{Assignment, ValueLedger};
use super::error::ModelError;
use super::mechanism::Mechanism;
use super::sampler::{NoiseSource, SamplingEngine};
use super::scm::{Intervention, StructuralCausalModel};
use smallvec::SmallVec;

pub(crate) fn run(
    scm: &StructuralCausalModel,
    observed: &Assignment,
    intervention: &Intervention,
) -> Result<Assignment, ModelError> {
    // 1. Abduction
    let noise = abduct(scm, observed)?;

    // 2. Action
    let mutilated = scm.intervene(intervention)?;

    // 3. Prediction. The mutilated graph shares node ids with the source
    //    graph, so the recovered ledger lines up.
    let mut source = NoiseSource::Replayed(&noise);
    let ledger = SamplingEngine::new(&mutilated).run(&mut source);
    Ok(ledger.into_assignment(mutilated.graph()))
}

/// Recovers every node's noise value from a complete observation.
fn abduct(scm: &StructuralCausalModel, observed: &Assignment) -> Result<ValueLedger, ModelError> {
    let dag = scm.graph();

    // The observation must name model variables only, and all of them.
    for name in observed.names() {
        if !dag.contains_node(name) {
            return Err(ModelError::UnknownNode {
                name: name.to_string(),
            });
        }
    }
    for id in dag.node_ids() {
        let name = dag.name_of(id);
        if observed.get(name).is_none() {
            return Err(ModelError::IncompleteObservation {
                name: name.to_string(),
            });
        }
    }

    let mut noise = ValueLedger::with_len(dag.node_count());
    for id in dag.node_ids() {
        let name = dag.name_of(id);
        let value = observed.get(name).expect("BUG: completeness checked above");

        match scm.equation_at(id).mechanism() {
            // An intervened node carries no noise to recover.
            Mechanism::Fixed { .. } => {}
            Mechanism::Exogenous { .. } => noise.insert(id, value),
            Mechanism::Additive { func, .. } => {
                let args: SmallVec<[f64; 4]> = scm
                    .parents_at(id)
                    .iter()
                    .map(|&parent| {
                        observed
                            .get(dag.name_of(parent))
                            .expect("BUG: completeness checked above")
                    })
                    .collect();
                noise.insert(id, value - func(&args));
            }
            Mechanism::Generative { .. } => {
                return Err(ModelError::NonInvertibleEquation {
                    name: name.to_string(),
                });
            }
        }
    }
    Ok(noise)
}
