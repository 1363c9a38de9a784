//! assignment.rs
//! Value storage for the sampling engine: a dense per-node ledger inside
//! the engine, converted to a name-keyed assignment at the boundary.

use crate::graph::{CausalDag, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A complete or partial mapping from variable names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    values: BTreeMap<String, f64>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|&(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.values.iter()
    }
}

impl FromIterator<(String, f64)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Dense storage of per-node values, indexed by `NodeId`.
///
/// Used both for sampled values and for recovered noise during
/// counterfactual replay.
#[derive(Debug, Clone, Default)]
pub(crate) struct ValueLedger {
    values: Vec<Option<f64>>,
}

impl ValueLedger {
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<f64> {
        *self.values.get(id.index())?
    }

    #[inline]
    pub(crate) fn insert(&mut self, id: NodeId, value: f64) {
        let idx = id.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    /// Clones out a name-keyed view; the boundary copy is expected.
    pub(crate) fn into_assignment(self, dag: &CausalDag) -> Assignment {
        dag.node_ids()
            .map(|id| {
                let value = self
                    .get(id)
                    .expect("BUG: every node is assigned before conversion");
                (dag.name_of(id).to_string(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_round_trip() {
        let mut assignment = Assignment::new();
        assignment.set("a", 1.5);
        assignment.set("b", -2.0);

        assert_eq!(assignment.get("a"), Some(1.5));
        assert_eq!(assignment.get("missing"), None);
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment, Assignment::from_pairs(&[("a", 1.5), ("b", -2.0)]));
    }

    #[test]
    fn test_ledger_conversion_keys_by_name() {
        let dag = CausalDag::from_edges(&[("a", "b")]).unwrap();
        let mut ledger = ValueLedger::with_len(dag.node_count());
        for (i, id) in dag.node_ids().enumerate() {
            ledger.insert(id, i as f64);
        }

        let assignment = ledger.into_assignment(&dag);
        assert_eq!(assignment.get("a"), Some(0.0));
        assert_eq!(assignment.get("b"), Some(1.0));
    }
}
