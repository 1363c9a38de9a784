//! Causal reasoning over directed acyclic graphs.
//!
//! Two families of questions are answered here. Graphical: which
//! conditional independences does a causal structure imply (d-separation),
//! which variable sets license effect estimation under confounding
//! (backdoor adjustment), and which structures are observationally
//! indistinguishable (Markov equivalence). Generative: given explicit
//! structural equations and noise, what do observational, interventional
//! and counterfactual worlds look like.
//!
//! Graphs and models are immutable value objects; every transformation
//! (moralization, do-operator, mutilation) returns a new structure.
//! Randomness is always seeded explicitly, so independent queries and
//! draws are safe to run concurrently.

pub mod analysis;
pub mod display;
pub mod graph;
pub mod model;

pub use analysis::{
    all_independence_relationships, backdoor_paths, equivalence_class, equivalence_signature,
    is_d_separated, is_markov_equivalent, moralize, satisfies_backdoor, AdjustmentSets,
    AnalysisError, EquivalenceSignature, MoralGraph,
};
pub use display::factorization;
pub use graph::{CausalDag, GraphDescription, GraphError, NodeId};
pub use model::{
    Assignment, Intervention, Mechanism, ModelError, NoiseModel, StructuralCausalModel,
    StructuralEquation,
};
