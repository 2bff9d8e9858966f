//! Network graph: node arena plus symmetric adjacency.
//!
//! Nodes live in a single `Vec` in canonical (creation/import) order and
//! refer to each other by [`NodeId`]. All edge mutation goes through
//! [`NetworkGraph::connect`], which keeps adjacency symmetric, loop-free and
//! duplicate-free.

use std::sync::Arc;

use rand::Rng;

use super::shuffle::{shuffle_in_place, ShuffleMode};
use crate::agent::{AgentNode, Behavior, NodeId};

/// Ordered collection of agents and the undirected edges between them
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    nodes: Vec<AgentNode>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node and returns its handle.
    ///
    /// Any neighbour list carried by `node` is discarded; edges must be
    /// added with [`connect`](Self::connect).
    pub fn add_node(&mut self, mut node: AgentNode) -> NodeId {
        node.neighbours.clear();
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&AgentNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut AgentNode> {
        self.nodes.get_mut(id.index())
    }

    /// All nodes in canonical order
    pub fn nodes(&self) -> &[AgentNode] {
        &self.nodes
    }

    /// Node handles in canonical order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AgentNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// First node whose name matches exactly
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    /// Connects `a` and `b` in both directions.
    ///
    /// Idempotent. Does nothing when `a == b` or either handle is unknown.
    /// Returns true if an edge that did not exist before was added.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || a.index() >= self.nodes.len() || b.index() >= self.nodes.len() {
            return false;
        }

        let mut added = false;
        if !self.nodes[a.index()].neighbours.contains(&b) {
            self.nodes[a.index()].neighbours.push(b);
            added = true;
        }
        if !self.nodes[b.index()].neighbours.contains(&a) {
            self.nodes[b.index()].neighbours.push(a);
            added = true;
        }
        added
    }

    pub fn are_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbours_of(a).contains(&b)
    }

    /// Neighbour handles of `id`; empty for an unknown handle
    pub fn neighbours_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.neighbours()).unwrap_or(&[])
    }

    /// Neighbour nodes of `id`, in adjacency order
    pub fn neighbours(&self, id: NodeId) -> impl Iterator<Item = &AgentNode> + '_ {
        self.neighbours_of(id)
            .iter()
            .filter_map(move |n| self.nodes.get(n.index()))
    }

    /// Names of the neighbours of `id`, in adjacency order
    pub fn neighbour_names(&self, id: NodeId) -> Vec<&str> {
        self.neighbours(id).map(|n| n.name.as_str()).collect()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbours_of(id).len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(AgentNode::degree).sum::<usize>() / 2
    }

    pub fn set_value(&mut self, id: NodeId, value: f64) {
        if let Some(node) = self.node_mut(id) {
            node.value = value;
        }
    }

    /// Attaches a behavior to one node, overriding the scheduler default
    pub fn set_behavior(&mut self, id: NodeId, behavior: Arc<dyn Behavior>) {
        if let Some(node) = self.node_mut(id) {
            node.behavior = Some(behavior);
        }
    }

    /// Fresh permutation of every node handle.
    ///
    /// The canonical order of the graph is left untouched.
    pub fn random_order<R: Rng + ?Sized>(&self, rng: &mut R, mode: ShuffleMode) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = self.ids().collect();
        shuffle_in_place(&mut order, rng, mode);
        order
    }
}
