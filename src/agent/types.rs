//! Agent type definitions.
//!
//! This module contains the core node type held by a [`NetworkGraph`](crate::topology::NetworkGraph):
//! identity, the two coordinate spaces, the scalar value and the adjacency list.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::behavior::Behavior;

/// Sentinel used for any coordinate that has not been assigned.
pub const UNSET: i32 = -1;

/// Handle of a node inside its owning graph.
///
/// The wrapped index is the node's position in canonical (creation/import)
/// order. Handles are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Returns the canonical index of this node
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Integer position in one coordinate space. Any axis may be [`UNSET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    /// A position with every axis unset
    pub const fn unset() -> Self {
        Self { x: UNSET, y: UNSET, z: UNSET }
    }

    /// A planar position with z left unset
    pub const fn planar(x: i32, y: i32) -> Self {
        Self { x, y, z: UNSET }
    }

    /// Returns true if both planar axes carry a value
    pub fn is_placed(&self) -> bool {
        self.x != UNSET && self.y != UNSET
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::unset()
    }
}

/// A single agent in the network.
///
/// Neighbours are stored as [`NodeId`] handles into the owning graph, never
/// as owned nodes. Adjacency is only mutated through the graph so that the
/// symmetry, no-self-loop and no-duplicate invariants hold.
#[derive(Clone, Default)]
pub struct AgentNode {
    pub name: String,
    /// Geographic position
    pub geo: Position,
    /// Graph-space (layout) position
    pub graph: Position,
    pub value: f64,
    /// Open key/value extensions; `None` until something is stored.
    pub attributes: Option<BTreeMap<String, String>>,
    pub(crate) neighbours: Vec<NodeId>,
    pub(crate) behavior: Option<Arc<dyn Behavior>>,
}

impl AgentNode {
    /// Creates a node with unset coordinates, value 0 and no neighbours
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attaches a behavior strategy, replacing the scheduler default for this node
    pub fn with_behavior(mut self, behavior: Arc<dyn Behavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Neighbour handles in insertion order
    pub fn neighbours(&self) -> &[NodeId] {
        &self.neighbours
    }

    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }

    /// The behavior attached to this node, if any
    pub fn behavior(&self) -> Option<&Arc<dyn Behavior>> {
        self.behavior.as_ref()
    }

    /// Looks up a single attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get(key))
            .map(String::as_str)
    }

    /// Stores an attribute, creating the mapping on first use
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }
}

impl fmt::Debug for AgentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentNode")
            .field("name", &self.name)
            .field("geo", &self.geo)
            .field("graph", &self.graph)
            .field("value", &self.value)
            .field("attributes", &self.attributes)
            .field("neighbours", &self.neighbours)
            .field("behavior", &self.behavior.as_ref().map(|b| b.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_defaults() {
        let node = AgentNode::new("Agent-0");
        assert_eq!(node.name, "Agent-0");
        assert_eq!(node.geo, Position::unset());
        assert_eq!(node.graph.x, UNSET);
        assert_eq!(node.value, 0.0);
        assert!(node.attributes.is_none());
        assert!(node.neighbours().is_empty());
        assert!(node.behavior().is_none());
    }

    #[test]
    fn test_attributes_created_on_first_write() {
        let mut node = AgentNode::new("a");
        assert_eq!(node.attribute("colour"), None);

        node.set_attribute("colour", "red");
        assert_eq!(node.attribute("colour"), Some("red"));
        assert_eq!(node.attributes.as_ref().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_position_placement() {
        assert!(!Position::unset().is_placed());
        assert!(!Position { x: 3, y: UNSET, z: UNSET }.is_placed());
        assert!(Position::planar(0, 0).is_placed());
    }
}
