//! Defines the error types for the structural-model engine.
use crate::graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Structural failures surfaced while deriving the model's graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A name was referenced that is not a variable of the model.
    #[error("no node named '{name}' in the model")]
    UnknownNode { name: String },

    /// Every node needs exactly one structural equation.
    #[error("node '{name}' has no structural equation")]
    MissingEquation { name: String },

    /// An equation's declared inputs must equal the node's graph parents.
    #[error("equation parents {declared:?} for '{name}' do not match graph parents {graph:?}")]
    ParentMismatch {
        name: String,
        declared: Vec<String>,
        graph: Vec<String>,
    },

    /// Counterfactual abduction needs the equation to be invertible in its
    /// noise argument; generative mechanisms are not.
    #[error("equation for '{name}' is not invertible in its noise argument")]
    NonInvertibleEquation { name: String },

    /// Counterfactual queries require a value for every node.
    #[error("observation is missing node '{name}'")]
    IncompleteObservation { name: String },

    /// Noise parameters are validated eagerly at construction.
    #[error("invalid noise for '{name}': {reason}")]
    InvalidNoise { name: String, reason: String },
}
