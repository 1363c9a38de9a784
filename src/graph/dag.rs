//! dag.rs
//! Wraps the generic directed-graph engine (petgraph) with the primitive
//! queries the causal layer consumes: parents, children, ancestral closure,
//! descendants, topological order and simple paths. The causal algorithms
//! never touch adjacency storage directly.

use super::error::GraphError;
use petgraph::algo::{all_simple_paths, toposort};
use petgraph::graph::{DiGraph, UnGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

/// A unique, stable identifier for a node within the graph.
///
/// This is a type alias for `petgraph::graph::NodeIndex` to abstract the
/// underlying graph implementation.
pub type NodeId = petgraph::graph::NodeIndex;

/// A validated causal DAG over named variables.
///
/// Invariants, enforced at construction and never re-checked by queries:
/// acyclic, no self-loops, no parallel edges, every edge endpoint declared,
/// set nodes (targets of a `do`) have no inbound edges. The structure is
/// immutable once built; every transformation returns a new `CausalDag`.
#[derive(Debug, Clone)]
pub struct CausalDag {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeId>,
    /// Cached topological order. Valid for the lifetime of the graph since
    /// the graph cannot be mutated after construction.
    topo: Vec<NodeId>,
    /// Nodes whose value is held fixed by an intervention.
    set_nodes: BTreeSet<NodeId>,
}

impl CausalDag {
    /// Builds a DAG from explicit node and edge lists.
    pub fn from_parts(nodes: &[&str], edges: &[(&str, &str)]) -> Result<Self, GraphError> {
        Self::build(
            nodes.iter().map(|n| n.to_string()).collect(),
            edges
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            Vec::new(),
        )
    }

    /// Builds a DAG from an edge list alone, declaring every endpoint as a node.
    pub fn from_edges(edges: &[(&str, &str)]) -> Result<Self, GraphError> {
        let mut nodes = Vec::new();
        let mut seen = BTreeSet::new();
        for &(a, b) in edges {
            for name in [a, b] {
                if seen.insert(name) {
                    nodes.push(name);
                }
            }
        }
        Self::from_parts(&nodes, edges)
    }

    pub(crate) fn build(
        nodes: Vec<String>,
        edges: Vec<(String, String)>,
        set_nodes: Vec<String>,
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut index = HashMap::with_capacity(nodes.len());

        // 1. Register Nodes
        for name in nodes {
            if index.contains_key(&name) {
                return Err(GraphError::DuplicateNode { name });
            }
            let id = graph.add_node(name.clone());
            index.insert(name, id);
        }

        // 2. Register Edges (parallel edges collapse silently)
        for (a, b) in edges {
            let pa = *index
                .get(&a)
                .ok_or(GraphError::UnknownNode { name: a.clone() })?;
            let pb = *index
                .get(&b)
                .ok_or(GraphError::UnknownNode { name: b.clone() })?;
            if pa == pb {
                return Err(GraphError::SelfLoop { name: a });
            }
            if graph.find_edge(pa, pb).is_none() {
                graph.add_edge(pa, pb, ());
            }
        }

        // 3. Acyclicity. The topological order doubles as the cycle check,
        //    and is cached for the sampling engine.
        let topo = toposort(&graph, None).map_err(|_| GraphError::Cycle)?;

        // 4. Set nodes are severed from their natural causes.
        let mut set_ids = BTreeSet::new();
        for name in set_nodes {
            let id = *index
                .get(&name)
                .ok_or(GraphError::UnknownNode { name: name.clone() })?;
            if graph.neighbors_directed(id, Incoming).next().is_some() {
                return Err(GraphError::SetNodeHasParents { name });
            }
            set_ids.insert(id);
        }

        Ok(Self {
            graph,
            index,
            topo,
            set_nodes: set_ids,
        })
    }

    // --- Primitive Queries ---

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All variable names, sorted.
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.graph.node_weights().map(|n| n.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// All edges as (parent, child) name pairs, sorted.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut edges: Vec<(&str, &str)> = self
            .graph
            .edge_references()
            .map(|e| (self.name_of(e.source()), self.name_of(e.target())))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Names of nodes held fixed by an intervention, sorted.
    pub fn set_node_names(&self) -> Vec<&str> {
        self.set_nodes.iter().map(|&id| self.name_of(id)).collect()
    }

    pub fn is_set_node(&self, name: &str) -> bool {
        self.id_of(name)
            .map(|id| self.set_nodes.contains(&id))
            .unwrap_or(false)
    }

    /// Direct parents of a node, sorted by name.
    pub fn parents_of(&self, name: &str) -> Result<Vec<&str>, GraphError> {
        let id = self.require(name)?;
        let mut parents: Vec<&str> = self.parent_ids(id).map(|p| self.name_of(p)).collect();
        parents.sort_unstable();
        Ok(parents)
    }

    /// Direct children of a node, sorted by name.
    pub fn children_of(&self, name: &str) -> Result<Vec<&str>, GraphError> {
        let id = self.require(name)?;
        let mut children: Vec<&str> = self.child_ids(id).map(|c| self.name_of(c)).collect();
        children.sort_unstable();
        Ok(children)
    }

    /// Strict ancestors of a node set (the set itself is excluded).
    pub fn ancestors_of(&self, names: &[&str]) -> Result<BTreeSet<String>, GraphError> {
        let mut seeds = BTreeSet::new();
        for name in names {
            seeds.insert(self.require(name)?);
        }
        let mut closure = self.ancestral_closure(seeds.iter().copied());
        for seed in &seeds {
            closure.remove(seed);
        }
        Ok(closure
            .iter()
            .map(|&id| self.name_of(id).to_string())
            .collect())
    }

    /// Strict descendants of a node.
    pub fn descendants_of(&self, name: &str) -> Result<BTreeSet<String>, GraphError> {
        let id = self.require(name)?;
        let mut reach = self.descendant_closure(id);
        reach.remove(&id);
        Ok(reach
            .iter()
            .map(|&d| self.name_of(d).to_string())
            .collect())
    }

    /// A valid topological order over all variables.
    pub fn topological_order(&self) -> Vec<&str> {
        self.topo.iter().map(|&id| self.name_of(id)).collect()
    }

    /// All simple directed paths from `a` to `b`, sorted.
    pub fn directed_paths_between(&self, a: &str, b: &str) -> Result<Vec<Vec<String>>, GraphError> {
        let pa = self.require(a)?;
        let pb = self.require(b)?;
        let mut paths: Vec<Vec<String>> =
            all_simple_paths::<Vec<NodeId>, _>(&self.graph, pa, pb, 0, None)
                .map(|path| path.iter().map(|&id| self.name_of(id).to_string()).collect())
                .collect();
        paths.sort();
        Ok(paths)
    }

    /// All simple paths from `a` to `b` in the skeleton (directions dropped), sorted.
    pub fn skeleton_paths_between(&self, a: &str, b: &str) -> Result<Vec<Vec<String>>, GraphError> {
        let pa = self.require(a)?;
        let pb = self.require(b)?;
        let skeleton = self.skeleton_graph();
        let mut paths: Vec<Vec<String>> =
            all_simple_paths::<Vec<NodeId>, _>(&skeleton, pa, pb, 0, None)
                .map(|path| path.iter().map(|&id| self.name_of(id).to_string()).collect())
                .collect();
        paths.sort();
        Ok(paths)
    }

    // --- Transformations ---

    /// Applies a graph-level intervention: inbound edges of `name` are
    /// removed and the node is marked as set. Returns a new graph.
    pub fn do_node(&self, name: &str) -> Result<CausalDag, GraphError> {
        self.do_nodes(&[name])
    }

    /// Intervenes on several nodes at once. Pure; `self` is untouched.
    pub fn do_nodes(&self, names: &[&str]) -> Result<CausalDag, GraphError> {
        let mut targets = BTreeSet::new();
        for name in names {
            targets.insert(self.require(name)?);
        }

        let nodes: Vec<String> = self.graph.node_weights().cloned().collect();
        let edges: Vec<(String, String)> = self
            .graph
            .edge_references()
            .filter(|e| !targets.contains(&e.target()))
            .map(|e| {
                (
                    self.name_of(e.source()).to_string(),
                    self.name_of(e.target()).to_string(),
                )
            })
            .collect();
        let set_nodes: Vec<String> = self
            .set_nodes
            .iter()
            .chain(targets.iter())
            .map(|&id| self.name_of(id).to_string())
            .collect();

        Self::build(nodes, edges, set_nodes)
    }

    /// Copy of the graph with every edge *out of* `id` removed. Used to
    /// expose backdoor paths: only edges into the treatment survive.
    pub(crate) fn without_outgoing(&self, id: NodeId) -> CausalDag {
        let nodes: Vec<String> = self.graph.node_weights().cloned().collect();
        let edges: Vec<(String, String)> = self
            .graph
            .edge_references()
            .filter(|e| e.source() != id)
            .map(|e| {
                (
                    self.name_of(e.source()).to_string(),
                    self.name_of(e.target()).to_string(),
                )
            })
            .collect();
        let set_nodes: Vec<String> = self
            .set_nodes
            .iter()
            .map(|&sid| self.name_of(sid).to_string())
            .collect();

        Self::build(nodes, edges, set_nodes)
            .expect("BUG: removing edges cannot invalidate a well-formed DAG")
    }

    // --- Internal (id-level) Accessors ---

    #[inline]
    pub(crate) fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub(crate) fn require(&self, name: &str) -> Result<NodeId, GraphError> {
        self.id_of(name).ok_or_else(|| GraphError::UnknownNode {
            name: name.to_string(),
        })
    }

    #[inline]
    pub(crate) fn name_of(&self, id: NodeId) -> &str {
        self.graph[id].as_str()
    }

    pub(crate) fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    pub(crate) fn parent_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors_directed(id, Incoming)
    }

    pub(crate) fn child_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors_directed(id, Outgoing)
    }

    pub(crate) fn topo_ids(&self) -> &[NodeId] {
        &self.topo
    }

    pub(crate) fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    /// The seeds plus every ancestor of a seed, via upstream traversal.
    pub(crate) fn ancestral_closure(
        &self,
        seeds: impl IntoIterator<Item = NodeId>,
    ) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = seeds.into_iter().collect();

        while let Some(node) = queue.pop_front() {
            if visited.insert(node) {
                for parent in self.parent_ids(node) {
                    queue.push_back(parent);
                }
            }
        }
        visited
    }

    /// The node plus everything downstream of it.
    pub(crate) fn descendant_closure(&self, start: NodeId) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            if visited.insert(node) {
                for child in self.child_ids(node) {
                    queue.push_back(child);
                }
            }
        }
        visited
    }

    /// Undirected copy sharing node indices with the directed graph.
    fn skeleton_graph(&self) -> UnGraph<String, ()> {
        let mut skeleton = UnGraph::with_capacity(self.graph.node_count(), self.graph.edge_count());
        for weight in self.graph.node_weights() {
            skeleton.add_node(weight.clone());
        }
        for e in self.graph.edge_references() {
            skeleton.add_edge(e.source(), e.target(), ());
        }
        skeleton
    }
}

impl PartialEq for CausalDag {
    /// Structural equality: same variables, same edges, same set nodes.
    fn eq(&self, other: &Self) -> bool {
        self.node_names() == other.node_names()
            && self.edges() == other.edges()
            && self.set_node_names() == other.set_node_names()
    }
}

impl Eq for CausalDag {}

impl fmt::Display for CausalDag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CausalDag({})", self.node_names().join(", "))
    }
}
