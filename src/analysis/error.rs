//! Defines the error types for the causal analysis queries.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A query referenced a node absent from the graph.
    #[error("unknown node '{name}' in query")]
    InvalidNode { name: String },

    /// X, Y and Z must be pairwise disjoint in an independence query.
    #[error("query sets are not pairwise disjoint (offending node '{name}')")]
    ConditioningOverlap { name: String },

    /// X and Y must be non-empty in an independence query.
    #[error("independence query requires non-empty X and Y")]
    EmptyQuerySet,

    /// Markov equivalence is only defined over identical variable sets.
    #[error("graphs are defined over different variable sets")]
    NodeSetMismatch,

    /// Backdoor queries need distinct treatment and outcome.
    #[error("treatment and outcome must be distinct")]
    TreatmentIsOutcome,

    /// An adjustment set may not contain the treatment or the outcome.
    #[error("adjustment set may not contain query node '{name}'")]
    AdjustsForQueryNode { name: String },
}
