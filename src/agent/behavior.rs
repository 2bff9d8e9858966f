//! Per-round agent behavior strategies.
//!
//! The scheduler hands each node an [`AgentContext`] once per round. A
//! behavior may read any node in the graph through it, but may only write
//! the visited node's own value and attributes; adjacency is never reachable
//! from here.
//!
//! Reads are live: a neighbour visited earlier in the same round already
//! shows its new value, one visited later still shows the previous one.
//! There is no snapshot isolation between nodes within a round.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{AgentNode, NodeId};
use crate::topology::NetworkGraph;

/// Strategy computing a node's next state from its current neighbourhood.
pub trait Behavior: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Runs one update for the node behind `agent`
    fn update(&self, agent: &mut AgentContext<'_>);
}

/// View of the graph centred on the node being updated.
pub struct AgentContext<'a> {
    graph: &'a mut NetworkGraph,
    id: NodeId,
}

impl<'a> AgentContext<'a> {
    /// Returns `None` if `id` does not belong to `graph`
    pub(crate) fn new(graph: &'a mut NetworkGraph, id: NodeId) -> Option<Self> {
        graph.node(id)?;
        Some(Self { graph, id })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node being updated
    pub fn node(&self) -> &AgentNode {
        &self.graph.nodes()[self.id.index()]
    }

    pub fn value(&self) -> f64 {
        self.node().value
    }

    pub fn neighbour_count(&self) -> usize {
        self.node().degree()
    }

    /// Current state of every neighbour, in adjacency order
    pub fn neighbours(&self) -> impl Iterator<Item = &AgentNode> + '_ {
        self.graph.neighbours(self.id)
    }

    /// Read-only access to the whole graph
    pub fn graph(&self) -> &NetworkGraph {
        &*self.graph
    }

    pub fn set_value(&mut self, value: f64) {
        self.graph.set_value(self.id, value);
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if let Some(node) = self.graph.node_mut(self.id) {
            node.set_attribute(key, value);
        }
    }
}

/// Default behavior: value becomes the number of neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighbourCount;

impl Behavior for NeighbourCount {
    fn name(&self) -> &'static str {
        "neighbour_count"
    }

    fn update(&self, agent: &mut AgentContext<'_>) {
        let count = agent.neighbour_count() as f64;
        agent.set_value(count);
    }
}

/// Value becomes the mean of the neighbours' current values (0 when isolated).
#[derive(Debug, Clone, Copy, Default)]
pub struct NeighbourMean;

impl Behavior for NeighbourMean {
    fn name(&self) -> &'static str {
        "neighbour_mean"
    }

    fn update(&self, agent: &mut AgentContext<'_>) {
        let (sum, count) = agent
            .neighbours()
            .fold((0.0, 0usize), |(sum, count), n| (sum + n.value, count + 1));
        let mean = if count == 0 { 0.0 } else { sum / count as f64 };
        agent.set_value(mean);
    }
}

/// Built-in behaviors selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    #[default]
    NeighbourCount,
    NeighbourMean,
}

impl BehaviorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorKind::NeighbourCount => "neighbour_count",
            BehaviorKind::NeighbourMean => "neighbour_mean",
        }
    }

    /// Instantiates the strategy
    pub fn build(self) -> Arc<dyn Behavior> {
        match self {
            BehaviorKind::NeighbourCount => Arc::new(NeighbourCount),
            BehaviorKind::NeighbourMean => Arc::new(NeighbourMean),
        }
    }
}
