//! A synchronous, single-threaded sampling engine.
//!
//! Visits nodes in the graph's topological order, so every parent value is
//! in the ledger before its children need it. The noise source is either a
//! seeded generator (fresh draws) or a ledger of recovered noise
//! (counterfactual replay); the evaluation loop is identical for both.

use super::assignment::ValueLedger;
use super::mechanism::Mechanism;
use super::scm::StructuralCausalModel;
use crate::graph::NodeId;
use rand::rngs::StdRng;
use smallvec::SmallVec;

/// Where per-node noise values come from.
pub(crate) enum NoiseSource<'a> {
    /// Fresh draws from each node's own distribution.
    Seeded(StdRng),
    /// Replay of noise recovered by abduction, keyed by node id.
    Replayed(&'a ValueLedger),
}

pub(crate) struct SamplingEngine<'a> {
    scm: &'a StructuralCausalModel,
}

impl<'a> SamplingEngine<'a> {
    pub(crate) fn new(scm: &'a StructuralCausalModel) -> Self {
        Self { scm }
    }

    /// Evaluates every node once and returns the filled ledger.
    pub(crate) fn run(&self, noise: &mut NoiseSource<'_>) -> ValueLedger {
        let dag = self.scm.graph();
        let mut ledger = ValueLedger::with_len(dag.node_count());

        for &id in dag.topo_ids() {
            let equation = self.scm.equation_at(id);

            let mut args: SmallVec<[f64; 4]> = SmallVec::new();
            for &parent in self.scm.parents_at(id) {
                args.push(
                    ledger
                        .get(parent)
                        .expect("BUG: parent unassigned despite topological order"),
                );
            }

            let value = match equation.mechanism() {
                Mechanism::Fixed { value } => *value,
                Mechanism::Exogenous { noise: model } => Self::draw(noise, id, model),
                Mechanism::Additive { func, noise: model } => {
                    func(&args) + Self::draw(noise, id, model)
                }
                Mechanism::Generative { func, noise: model } => {
                    func(&args, Self::draw(noise, id, model))
                }
            };
            ledger.insert(id, value);
        }
        ledger
    }

    fn draw(
        source: &mut NoiseSource<'_>,
        id: NodeId,
        model: &super::mechanism::NoiseModel,
    ) -> f64 {
        match source {
            NoiseSource::Seeded(rng) => model.draw(rng),
            NoiseSource::Replayed(ledger) => ledger
                .get(id)
                .expect("BUG: abduction recovers noise for every stochastic node"),
        }
    }
}
