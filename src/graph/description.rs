//! Serializable edge-list description of a causal graph.
//!
//! This is the only persistence surface of the crate: a plain
//! nodes-plus-edges record that round-trips through JSON. Everything
//! derived (moral graphs, signatures, adjustment sets) is recomputed,
//! never stored.

use super::dag::CausalDag;
use super::error::GraphError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
    /// Nodes held fixed by an intervention; empty for observational graphs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_nodes: Vec<String>,
}

impl GraphDescription {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}

impl CausalDag {
    /// Snapshot of the graph as a plain description.
    pub fn description(&self) -> GraphDescription {
        GraphDescription {
            nodes: self.node_names().iter().map(|n| n.to_string()).collect(),
            edges: self
                .edges()
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            set_nodes: self
                .set_node_names()
                .iter()
                .map(|n| n.to_string())
                .collect(),
        }
    }

    /// Rebuilds a graph from a description, re-running all construction checks.
    pub fn from_description(description: &GraphDescription) -> Result<Self, GraphError> {
        Self::build(
            description.nodes.clone(),
            description.edges.clone(),
            description.set_nodes.clone(),
        )
    }
}
