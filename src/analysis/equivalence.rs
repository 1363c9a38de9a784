//! Markov equivalence classification.
//!
//! Two DAGs are observationally indistinguishable iff they share the same
//! skeleton and the same set of v-structures (unshielded colliders). The
//! signature below is exactly that pair, so equivalence reduces to
//! signature equality.

use super::error::AnalysisError;
use crate::graph::CausalDag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The invariant of a Markov equivalence class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceSignature {
    /// Undirected edge set, each pair canonically ordered.
    pub skeleton: BTreeSet<(String, String)>,
    /// Unshielded colliders as (parent, parent, child) with the parents
    /// canonically ordered, so detection is order-independent.
    pub v_structures: BTreeSet<(String, String, String)>,
}

/// Computes the (skeleton, v-structures) signature of a DAG.
pub fn equivalence_signature(dag: &CausalDag) -> EquivalenceSignature {
    let mut skeleton = BTreeSet::new();
    for (a, b) in dag.edges() {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        skeleton.insert((lo.to_string(), hi.to_string()));
    }

    let mut v_structures = BTreeSet::new();
    for child in dag.node_ids() {
        let parents: Vec<_> = dag.parent_ids(child).collect();
        for (i, &a) in parents.iter().enumerate() {
            for &b in &parents[i + 1..] {
                // Shielded colliders (parents linked either way) carry no
                // observational fingerprint.
                if dag.has_edge(a, b) || dag.has_edge(b, a) {
                    continue;
                }
                let (mut lo, mut hi) = (dag.name_of(a), dag.name_of(b));
                if lo > hi {
                    std::mem::swap(&mut lo, &mut hi);
                }
                v_structures.insert((
                    lo.to_string(),
                    hi.to_string(),
                    dag.name_of(child).to_string(),
                ));
            }
        }
    }

    EquivalenceSignature {
        skeleton,
        v_structures,
    }
}

/// Whether two DAGs are Markov equivalent.
///
/// Only defined over identical variable sets; differing sets fail with
/// `NodeSetMismatch`.
pub fn is_markov_equivalent(a: &CausalDag, b: &CausalDag) -> Result<bool, AnalysisError> {
    if a.node_names() != b.node_names() {
        return Err(AnalysisError::NodeSetMismatch);
    }
    Ok(equivalence_signature(a) == equivalence_signature(b))
}

/// Enumerates every DAG Markov equivalent to the input, the input itself
/// included. Tries each orientation of the skeleton and keeps the acyclic
/// ones with a matching signature; exponential in skeleton size, intended
/// for the small graphs this crate targets.
pub fn equivalence_class(dag: &CausalDag) -> Vec<CausalDag> {
    let reference = equivalence_signature(dag);
    let skeleton: Vec<(String, String)> = reference.skeleton.iter().cloned().collect();
    let nodes: Vec<String> = dag.node_names().iter().map(|n| n.to_string()).collect();

    let mut members = Vec::new();
    let mut oriented = Vec::with_capacity(skeleton.len());
    orient(&nodes, &skeleton, &mut oriented, &reference, &mut members);
    members
}

fn orient(
    nodes: &[String],
    remaining: &[(String, String)],
    oriented: &mut Vec<(String, String)>,
    reference: &EquivalenceSignature,
    members: &mut Vec<CausalDag>,
) {
    let Some((a, b)) = remaining.first() else {
        // Cyclic orientations simply fail to build and are skipped.
        if let Ok(candidate) = CausalDag::build(nodes.to_vec(), oriented.clone(), Vec::new()) {
            if equivalence_signature(&candidate) == *reference {
                members.push(candidate);
            }
        }
        return;
    };

    oriented.push((a.clone(), b.clone()));
    orient(nodes, &remaining[1..], oriented, reference, members);
    oriented.pop();

    oriented.push((b.clone(), a.clone()));
    orient(nodes, &remaining[1..], oriented, reference, members);
    oriented.pop();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dag(edges: &[(&str, &str)]) -> CausalDag {
        CausalDag::from_edges(edges).unwrap()
    }

    #[test]
    fn test_signature_of_collider() {
        let sig = equivalence_signature(&dag(&[("a", "b"), ("c", "b")]));
        assert_eq!(
            sig.skeleton,
            [("a", "b"), ("b", "c")]
                .iter()
                .map(|(x, y)| (x.to_string(), y.to_string()))
                .collect()
        );
        assert_eq!(
            sig.v_structures,
            [("a".to_string(), "c".to_string(), "b".to_string())]
                .into_iter()
                .collect()
        );
    }

    #[test]
    fn test_shielded_collider_is_no_v_structure() {
        // a -> b <- c with a -> c: the collider is shielded.
        let sig = equivalence_signature(&dag(&[("a", "b"), ("c", "b"), ("a", "c")]));
        assert!(sig.v_structures.is_empty());
    }

    #[test]
    fn test_chain_fork_reversal_all_equivalent() {
        let forward = dag(&[("a", "b"), ("b", "c")]);
        let backward = dag(&[("c", "b"), ("b", "a")]);
        let fork = dag(&[("b", "a"), ("b", "c")]);

        assert!(is_markov_equivalent(&forward, &backward).unwrap());
        assert!(is_markov_equivalent(&forward, &fork).unwrap());
        assert!(is_markov_equivalent(&backward, &fork).unwrap());
    }

    #[test]
    fn test_collider_not_equivalent_to_chain() {
        let chain = dag(&[("a", "b"), ("b", "c")]);
        let collider = dag(&[("a", "b"), ("c", "b")]);
        assert!(!is_markov_equivalent(&chain, &collider).unwrap());
    }

    #[test]
    fn test_node_set_mismatch_rejected() {
        let small = dag(&[("a", "b")]);
        let large = dag(&[("a", "b"), ("b", "c")]);
        assert_eq!(
            is_markov_equivalent(&small, &large).unwrap_err(),
            AnalysisError::NodeSetMismatch
        );
    }

    #[test]
    fn test_equivalence_class_of_chain_has_three_members() {
        let chain = dag(&[("a", "b"), ("b", "c")]);
        let class = equivalence_class(&chain);
        assert_eq!(class.len(), 3);
        assert!(class.contains(&chain));
        for member in &class {
            assert!(is_markov_equivalent(&chain, member).unwrap());
        }
    }

    #[test]
    fn test_equivalence_class_of_collider_is_singleton() {
        let collider = dag(&[("a", "b"), ("c", "b")]);
        let class = equivalence_class(&collider);
        assert_eq!(class, vec![collider]);
    }
}
