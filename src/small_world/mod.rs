//! Small-world rewiring.
//!
//! Turns a ring (or any imported graph) into a clustered small-world network
//! by repeatedly linking agents to partners that share many of their
//! neighbours.

pub mod propensity;
pub mod rewirer;

pub use rewirer::{RewireSummary, SmallWorldParams, SmallWorldRewirer, MAX_ATTEMPTS};

/// Rewiring precondition violations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RewireError {
    #[error("k must be a positive finite number, got {0}")]
    InvalidK(f64),
    #[error("alpha must be finite, got {0}")]
    InvalidAlpha(f64),
    #[error("constant must lie strictly between 0 and 1, got {0}")]
    InvalidConstant(f64),
    #[error("rewiring needs at least 2 agents, graph has {0}")]
    TooFewAgents(usize),
    #[error("k = {k} over {agents} agents needs more than {max} attempts", max = MAX_ATTEMPTS)]
    TooManyAttempts { k: f64, agents: usize },
}
