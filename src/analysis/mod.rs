//! Pure derived computations over immutable graph snapshots.
//!
//! Nothing in this module stores state on the graph: moral graphs,
//! equivalence signatures and adjustment-set validity are recomputed per
//! query, so there is nothing to invalidate when a caller builds a new
//! graph.
pub mod adjustment;
pub mod equivalence;
pub mod moral;
pub mod separation;

mod error;
pub(crate) mod subsets;

pub use adjustment::{backdoor_paths, satisfies_backdoor, AdjustmentSets};
pub use equivalence::{
    equivalence_class, equivalence_signature, is_markov_equivalent, EquivalenceSignature,
};
pub use error::AnalysisError;
pub use moral::{moralize, MoralGraph};
pub use separation::{all_independence_relationships, is_d_separated};
