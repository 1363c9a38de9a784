//! Structural causal model: a causal DAG with one mechanism per node.
//!
//! Validation is eager: by the time a model exists, every node has exactly
//! one equation, the equation's declared inputs match the node's graph
//! parents, and all noise parameters are well-formed. The sampling and
//! counterfactual engines rely on this and never re-validate.

use super::assignment::Assignment;
use super::counterfactual;
use super::error::ModelError;
use super::mechanism::StructuralEquation;
use super::sampler::{NoiseSource, SamplingEngine};
use crate::graph::{CausalDag, NodeId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{btree_map, BTreeMap, BTreeSet};

/// A do-style assignment: the named nodes are forced to fixed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    settings: BTreeMap<String, f64>,
}

impl Intervention {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: `Intervention::new().set("x", 5.0)`.
    pub fn set(mut self, name: &str, value: f64) -> Self {
        self.settings.insert(name.to_string(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.settings.iter()
    }
}

/// A causal DAG annotated with structural equations, sufficient to
/// simulate observational, interventional and counterfactual
/// distributions.
#[derive(Debug, Clone)]
pub struct StructuralCausalModel {
    dag: CausalDag,
    /// One equation per node, indexed by `NodeId`.
    equations: Vec<StructuralEquation>,
    /// Declared-order parent ids per node, resolved once at construction.
    resolved_parents: Vec<SmallVec<[NodeId; 4]>>,
}

impl StructuralCausalModel {
    /// Attaches equations to an existing graph.
    pub fn new(
        dag: CausalDag,
        equations: BTreeMap<String, StructuralEquation>,
    ) -> Result<Self, ModelError> {
        for name in equations.keys() {
            if !dag.contains_node(name) {
                return Err(ModelError::UnknownNode { name: name.clone() });
            }
        }

        let mut slots: Vec<Option<StructuralEquation>> = vec![None; dag.node_count()];
        for (name, equation) in equations {
            let id = dag.id_of(&name).expect("BUG: names checked above");
            slots[id.index()] = Some(equation);
        }

        let mut resolved_parents = vec![SmallVec::new(); dag.node_count()];
        let mut checked = Vec::with_capacity(dag.node_count());
        for id in dag.node_ids() {
            let name = dag.name_of(id);
            let equation = slots[id.index()]
                .take()
                .ok_or_else(|| ModelError::MissingEquation {
                    name: name.to_string(),
                })?;

            // The declared input set must equal the node's parent set, with
            // no duplicate declarations.
            let declared: BTreeSet<&str> = equation.parents().iter().map(|p| p.as_str()).collect();
            let graph_parents: BTreeSet<&str> = dag
                .parents_of(name)
                .expect("BUG: node listed by the dag")
                .into_iter()
                .collect();
            if declared != graph_parents || declared.len() != equation.parents().len() {
                return Err(ModelError::ParentMismatch {
                    name: name.to_string(),
                    declared: equation.parents().to_vec(),
                    graph: graph_parents.iter().map(|p| p.to_string()).collect(),
                });
            }

            if let Some(noise) = equation.mechanism().noise() {
                noise.validate().map_err(|reason| ModelError::InvalidNoise {
                    name: name.to_string(),
                    reason,
                })?;
            }

            resolved_parents[id.index()] = equation
                .parents()
                .iter()
                .map(|p| dag.id_of(p).expect("BUG: parent sets matched above"))
                .collect();
            checked.push(equation);
        }

        Ok(Self {
            dag,
            equations: checked,
            resolved_parents,
        })
    }

    /// Derives the graph from the equations' declared parents, in the
    /// manner of assignment-map construction: every key is a node, every
    /// declared parent an edge.
    pub fn from_equations(
        equations: BTreeMap<String, StructuralEquation>,
    ) -> Result<Self, ModelError> {
        let nodes: Vec<String> = equations.keys().cloned().collect();
        let mut edges = Vec::new();
        for (child, equation) in &equations {
            for parent in equation.parents() {
                if !equations.contains_key(parent) {
                    return Err(ModelError::UnknownNode {
                        name: parent.clone(),
                    });
                }
                edges.push((parent.clone(), child.clone()));
            }
        }

        let dag = CausalDag::build(nodes, edges, Vec::new())?;
        Self::new(dag, equations)
    }

    pub fn graph(&self) -> &CausalDag {
        &self.dag
    }

    pub fn equation(&self, name: &str) -> Result<&StructuralEquation, ModelError> {
        let id = self.require(name)?;
        Ok(&self.equations[id.index()])
    }

    /// Draws one full assignment. Nodes are visited in topological order,
    /// one noise draw each; deterministic for a given seed.
    pub fn sample(&self, seed: u64) -> Assignment {
        let mut noise = NoiseSource::Seeded(StdRng::seed_from_u64(seed));
        SamplingEngine::new(self)
            .run(&mut noise)
            .into_assignment(&self.dag)
    }

    /// Independent draws under per-draw derived seeds. Draws share no
    /// mutable state, so they are evaluated in parallel.
    pub fn sample_many(&self, n_samples: usize, base_seed: u64) -> Vec<Assignment> {
        (0..n_samples)
            .into_par_iter()
            .map(|i| self.sample(base_seed.wrapping_add(i as u64)))
            .collect()
    }

    /// Applies the do-operator: returns the mutilated model in which each
    /// intervened node is constant and severed from its natural causes.
    /// Pure; `self` is never mutated.
    pub fn intervene(&self, intervention: &Intervention) -> Result<Self, ModelError> {
        let mut targets = Vec::new();
        for (name, _) in intervention.iter() {
            self.require(name)?;
            targets.push(name.as_str());
        }
        let dag = self.dag.do_nodes(&targets)?;

        let mut equations = BTreeMap::new();
        for id in self.dag.node_ids() {
            let name = self.dag.name_of(id);
            let equation = match intervention.settings.get(name) {
                Some(&value) => StructuralEquation::fixed(value),
                None => self.equations[id.index()].clone(),
            };
            equations.insert(name.to_string(), equation);
        }

        Self::new(dag, equations)
    }

    /// Counterfactual inference by abduction, action and prediction: the
    /// noise behind a fully observed world is recovered, the intervention
    /// applied, and the mutilated model replayed under that same noise.
    pub fn counterfactual(
        &self,
        observed: &Assignment,
        intervention: &Intervention,
    ) -> Result<Assignment, ModelError> {
        counterfactual::run(self, observed, intervention)
    }

    // --- Internal Accessors (engine-facing) ---

    pub(crate) fn require(&self, name: &str) -> Result<NodeId, ModelError> {
        self.dag.id_of(name).ok_or_else(|| ModelError::UnknownNode {
            name: name.to_string(),
        })
    }

    pub(crate) fn equation_at(&self, id: NodeId) -> &StructuralEquation {
        &self.equations[id.index()]
    }

    pub(crate) fn parents_at(&self, id: NodeId) -> &[NodeId] {
        &self.resolved_parents[id.index()]
    }
}

impl PartialEq for StructuralCausalModel {
    /// Structural equality: same graph, same equations (function-valued
    /// mechanisms by pointer identity).
    fn eq(&self, other: &Self) -> bool {
        self.dag == other.dag && self.equations == other.equations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mechanism::{Mechanism, NoiseModel};

    /// a = 1, b = a + 2, c = 2b. Deterministic throughout.
    fn chain_model() -> StructuralCausalModel {
        let mut equations = BTreeMap::new();
        equations.insert(
            "a".to_string(),
            StructuralEquation::exogenous(NoiseModel::Fixed { value: 1.0 }),
        );
        equations.insert(
            "b".to_string(),
            StructuralEquation::additive(&["a"], |p| p[0] + 2.0, NoiseModel::Fixed { value: 0.0 }),
        );
        equations.insert(
            "c".to_string(),
            StructuralEquation::additive(&["b"], |p| p[0] * 2.0, NoiseModel::Fixed { value: 0.0 }),
        );
        StructuralCausalModel::from_equations(equations).unwrap()
    }

    #[test]
    fn test_from_equations_derives_graph() {
        let model = chain_model();
        assert_eq!(
            model.graph().edges(),
            vec![("a", "b"), ("b", "c")]
        );
    }

    #[test]
    fn test_parent_mismatch_rejected() {
        let dag = CausalDag::from_edges(&[("a", "b")]).unwrap();
        let mut equations = BTreeMap::new();
        equations.insert(
            "a".to_string(),
            StructuralEquation::exogenous(NoiseModel::Fixed { value: 0.0 }),
        );
        // b's equation ignores its parent a.
        equations.insert(
            "b".to_string(),
            StructuralEquation::exogenous(NoiseModel::Fixed { value: 0.0 }),
        );

        match StructuralCausalModel::new(dag, equations).unwrap_err() {
            ModelError::ParentMismatch { name, graph, .. } => {
                assert_eq!(name, "b");
                assert_eq!(graph, vec!["a".to_string()]);
            }
            other => panic!("expected ParentMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_equation_rejected() {
        let dag = CausalDag::from_edges(&[("a", "b")]).unwrap();
        let mut equations = BTreeMap::new();
        equations.insert(
            "a".to_string(),
            StructuralEquation::exogenous(NoiseModel::Fixed { value: 0.0 }),
        );

        assert_eq!(
            StructuralCausalModel::new(dag, equations).unwrap_err(),
            ModelError::MissingEquation { name: "b".into() }
        );
    }

    #[test]
    fn test_equation_for_unknown_node_rejected() {
        let mut equations = BTreeMap::new();
        equations.insert(
            "a".to_string(),
            StructuralEquation::additive(&["ghost"], |p| p[0], NoiseModel::Fixed { value: 0.0 }),
        );

        assert_eq!(
            StructuralCausalModel::from_equations(equations).unwrap_err(),
            ModelError::UnknownNode {
                name: "ghost".into()
            }
        );
    }

    #[test]
    fn test_invalid_noise_rejected() {
        let mut equations = BTreeMap::new();
        equations.insert(
            "a".to_string(),
            StructuralEquation::exogenous(NoiseModel::Gaussian {
                mean: 0.0,
                std_dev: -1.0,
            }),
        );

        match StructuralCausalModel::from_equations(equations).unwrap_err() {
            ModelError::InvalidNoise { name, .. } => assert_eq!(name, "a"),
            other => panic!("expected InvalidNoise, got {other:?}"),
        }
    }

    #[test]
    fn test_intervene_replaces_equation_and_severs_edges() {
        let model = chain_model();
        let intervened = model.intervene(&Intervention::new().set("b", 10.0)).unwrap();

        assert_eq!(intervened.graph().edges(), vec![("b", "c")]);
        assert!(intervened.graph().is_set_node("b"));
        match intervened.equation("b").unwrap().mechanism() {
            Mechanism::Fixed { value } => assert_eq!(*value, 10.0),
            other => panic!("expected fixed mechanism, got {other:?}"),
        }
        // The source model keeps its structure.
        assert_eq!(model.graph().edges(), vec![("a", "b"), ("b", "c")]);
    }

    #[test]
    fn test_intervene_is_idempotent_on_structure() {
        let model = chain_model();
        let intervention = Intervention::new().set("b", 10.0);
        let once = model.intervene(&intervention).unwrap();
        let twice = once.intervene(&intervention).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_intervene_on_unknown_node_rejected() {
        let model = chain_model();
        assert_eq!(
            model
                .intervene(&Intervention::new().set("ghost", 1.0))
                .unwrap_err(),
            ModelError::UnknownNode {
                name: "ghost".into()
            }
        );
    }
}
