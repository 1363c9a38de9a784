//! Moral graph construction.
//!
//! The moral graph of an ancestral subgraph drops edge directions and
//! "marries" every pair of parents sharing a child, reducing d-separation
//! to plain reachability. It is a derived view: computed per query against
//! a borrowed graph snapshot and discarded afterwards, never cached on the
//! DAG itself.

use super::error::AnalysisError;
use crate::graph::{CausalDag, NodeId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Undirected view over the ancestral closure of a node subset.
#[derive(Debug, Clone)]
pub struct MoralGraph<'a> {
    dag: &'a CausalDag,
    members: BTreeSet<NodeId>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

/// Builds the moral graph over the ancestral closure of `subset`.
///
/// Fails with `InvalidNode` if any requested name is absent from the graph.
/// The input graph is not modified.
pub fn moralize<'a>(dag: &'a CausalDag, subset: &[&str]) -> Result<MoralGraph<'a>, AnalysisError> {
    let mut seeds = BTreeSet::new();
    for name in subset {
        let id = dag.id_of(name).ok_or_else(|| AnalysisError::InvalidNode {
            name: name.to_string(),
        })?;
        seeds.insert(id);
    }
    Ok(moralize_ids(dag, seeds))
}

/// Id-level moralization; the closure keeps parents inside the member set,
/// so marrying co-parents never reaches outside it.
pub(crate) fn moralize_ids(dag: &CausalDag, seeds: BTreeSet<NodeId>) -> MoralGraph<'_> {
    let members = dag.ancestral_closure(seeds);
    let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> =
        members.iter().map(|&id| (id, BTreeSet::new())).collect();

    // Closure members only: parents of a member are themselves members.
    fn link(adjacency: &mut BTreeMap<NodeId, BTreeSet<NodeId>>, a: NodeId, b: NodeId) {
        if let Some(set) = adjacency.get_mut(&a) {
            set.insert(b);
        }
        if let Some(set) = adjacency.get_mut(&b) {
            set.insert(a);
        }
    }

    for &child in &members {
        let parents: Vec<NodeId> = dag.parent_ids(child).collect();

        // 1. Drop directions on the retained edges.
        for &parent in &parents {
            link(&mut adjacency, parent, child);
        }

        // 2. Marry each pair of co-parents.
        for (i, &a) in parents.iter().enumerate() {
            for &b in &parents[i + 1..] {
                link(&mut adjacency, a, b);
            }
        }
    }

    MoralGraph {
        dag,
        members,
        adjacency,
    }
}

impl MoralGraph<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dag
            .id_of(name)
            .map(|id| self.members.contains(&id))
            .unwrap_or(false)
    }

    /// Whether an undirected link exists between two member nodes.
    pub fn has_link(&self, a: &str, b: &str) -> bool {
        match (self.dag.id_of(a), self.dag.id_of(b)) {
            (Some(ia), Some(ib)) => self
                .adjacency
                .get(&ia)
                .map(|set| set.contains(&ib))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Neighbors of a member node, sorted by name.
    pub fn neighbors_of(&self, name: &str) -> Vec<&str> {
        let Some(id) = self.dag.id_of(name) else {
            return Vec::new();
        };
        let mut neighbors: Vec<&str> = self
            .adjacency
            .get(&id)
            .map(|set| set.iter().map(|&n| self.dag.name_of(n)).collect())
            .unwrap_or_default();
        neighbors.sort_unstable();
        neighbors
    }

    /// True if some member of `xs` reaches some member of `ys` without
    /// stepping on `removed`. Plain BFS over the undirected adjacency.
    pub(crate) fn connects(
        &self,
        xs: &BTreeSet<NodeId>,
        ys: &BTreeSet<NodeId>,
        removed: &BTreeSet<NodeId>,
    ) -> bool {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = xs
            .iter()
            .copied()
            .filter(|id| !removed.contains(id))
            .collect();

        while let Some(node) = queue.pop_front() {
            if ys.contains(&node) {
                return true;
            }
            if visited.insert(node) {
                if let Some(neighbors) = self.adjacency.get(&node) {
                    for &next in neighbors {
                        if !removed.contains(&next) && !visited.contains(&next) {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collider_parents_are_married() {
        // a -> c <- b: moralizing over {a, b, c} links the two parents.
        let dag = CausalDag::from_edges(&[("a", "c"), ("b", "c")]).unwrap();
        let moral = moralize(&dag, &["a", "b", "c"]).unwrap();

        assert!(moral.has_link("a", "c"));
        assert!(moral.has_link("b", "c"));
        assert!(moral.has_link("a", "b"));
    }

    #[test]
    fn test_restricted_to_ancestral_closure() {
        // Moralizing over {a, b} of a -> c <- b excludes c entirely: c is
        // not an ancestor of either seed, so no marriage happens.
        let dag = CausalDag::from_edges(&[("a", "c"), ("b", "c")]).unwrap();
        let moral = moralize(&dag, &["a", "b"]).unwrap();

        assert_eq!(moral.len(), 2);
        assert!(!moral.contains("c"));
        assert!(!moral.has_link("a", "b"));
    }

    #[test]
    fn test_closure_pulls_in_ancestors() {
        let dag = CausalDag::from_edges(&[("a", "b"), ("b", "c")]).unwrap();
        let moral = moralize(&dag, &["c"]).unwrap();

        assert_eq!(moral.len(), 3);
        assert!(moral.has_link("a", "b"));
        assert!(moral.has_link("b", "c"));
        assert!(!moral.has_link("a", "c"));
    }

    #[test]
    fn test_unknown_node_rejected() {
        let dag = CausalDag::from_edges(&[("a", "b")]).unwrap();
        assert_eq!(
            moralize(&dag, &["a", "ghost"]).unwrap_err(),
            AnalysisError::InvalidNode {
                name: "ghost".into()
            }
        );
    }
}
