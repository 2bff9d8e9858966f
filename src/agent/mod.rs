//! Agent model: node data and pluggable per-round behaviors.

pub mod behavior;
pub mod types;

pub use behavior::{AgentContext, Behavior, BehaviorKind, NeighbourCount, NeighbourMean};
pub use types::{AgentNode, NodeId, Position, UNSET};
