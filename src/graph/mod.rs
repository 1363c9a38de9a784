//! Defines the core graph structure and its construction interface.
pub mod dag;
pub mod description;
mod error;

// Re-export key types for convenient access
pub use dag::{CausalDag, NodeId};
pub use description::GraphDescription;
pub use error::GraphError;
