//! Defines the error types for graph construction and primitive queries.
use thiserror::Error;

/// Structural errors reported eagerly at construction time.
///
/// Every later query assumes a well-formed graph, so nothing here can
/// surface after `CausalDag` construction has succeeded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The edge list describes a cyclic graph.
    #[error("graph contains a cycle")]
    Cycle,

    /// An edge connects a node to itself.
    #[error("self-loop on node '{name}'")]
    SelfLoop { name: String },

    /// A name was referenced that is not a declared node.
    #[error("unknown node '{name}'")]
    UnknownNode { name: String },

    /// The same variable name was declared twice.
    #[error("duplicate node '{name}'")]
    DuplicateNode { name: String },

    /// A node marked as intervened still has inbound edges.
    #[error("set node '{name}' cannot have parents")]
    SetNodeHasParents { name: String },
}
