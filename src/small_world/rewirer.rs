//! Small-world rewiring after Watts (1999), "Networks, Dynamics, and the
//! Small-World Phenomenon".
//!
//! Each pass visits every agent in a fresh random order. The visited agent
//! draws one partner with probability proportional to its propensity (see
//! [`propensity`](super::propensity)) and is connected to it. Every visit
//! counts as one attempt, whether or not the edge already existed, and the
//! run stops as soon as the attempt counter reaches `floor(k * n / 2)`,
//! even in the middle of a pass.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::propensity::{normalize, propensity_vector, select_index};
use super::RewireError;
use crate::agent::NodeId;
use crate::topology::{NetworkGraph, ShuffleMode};

/// Upper bound on `floor(k * n / 2)`; larger targets are rejected
pub const MAX_ATTEMPTS: usize = 100_000_000;

/// Watts' tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmallWorldParams {
    /// Target mean degree contribution
    pub k: f64,
    /// How sharply propensity falls off with fewer mutual neighbours
    pub alpha: f64,
    /// Floor probability for nodes sharing no neighbours
    pub constant: f64,
}

impl Default for SmallWorldParams {
    fn default() -> Self {
        Self {
            k: 4.0,
            alpha: 15.0,
            constant: 1e-10,
        }
    }
}

impl SmallWorldParams {
    /// Checks the parameters against a graph of `agents` nodes
    pub fn validate(&self, agents: usize) -> Result<(), RewireError> {
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(RewireError::InvalidK(self.k));
        }
        if !self.alpha.is_finite() {
            return Err(RewireError::InvalidAlpha(self.alpha));
        }
        if !(self.constant > 0.0 && self.constant < 1.0) {
            return Err(RewireError::InvalidConstant(self.constant));
        }
        if agents <= 1 {
            return Err(RewireError::TooFewAgents(agents));
        }
        if self.checked_target(agents).is_none() {
            return Err(RewireError::TooManyAttempts { k: self.k, agents });
        }
        Ok(())
    }

    /// `floor(k * n / 2)` if it is finite and within [`MAX_ATTEMPTS`]
    fn checked_target(&self, agents: usize) -> Option<usize> {
        let target = (self.k * agents as f64 / 2.0).floor();
        if target.is_finite() && target >= 0.0 && target <= MAX_ATTEMPTS as f64 {
            Some(target as usize)
        } else {
            None
        }
    }

    /// Attempt count at which rewiring stops: `floor(k * n / 2)`, capped at [`MAX_ATTEMPTS`]
    pub fn target_attempts(&self, agents: usize) -> usize {
        self.checked_target(agents).unwrap_or(MAX_ATTEMPTS)
    }
}

/// Outcome of one rewiring run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewireSummary {
    pub target: usize,
    /// Partner draws performed; equals `target` on success
    pub attempts: usize,
    /// Draws that produced an edge which did not exist before
    pub edges_added: usize,
    /// Shuffled passes started
    pub passes: usize,
}

/// Propensity-weighted rewirer
#[derive(Debug, Clone)]
pub struct SmallWorldRewirer {
    params: SmallWorldParams,
    shuffle: ShuffleMode,
}

impl SmallWorldRewirer {
    pub fn new(params: SmallWorldParams) -> Self {
        Self {
            params,
            shuffle: ShuffleMode::default(),
        }
    }

    pub fn with_shuffle(mut self, shuffle: ShuffleMode) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Adds edges to `graph` until the attempt target is reached.
    ///
    /// Invalid parameters (including a graph with fewer than two nodes) are
    /// rejected before anything is touched.
    pub fn rewire<R: Rng + ?Sized>(
        &self,
        graph: &mut NetworkGraph,
        rng: &mut R,
    ) -> Result<RewireSummary, RewireError> {
        let agents = graph.len();
        self.params.validate(agents)?;

        let mut summary = RewireSummary {
            target: self.params.target_attempts(agents),
            ..RewireSummary::default()
        };
        info!(
            "Rewiring {} agents (k={}, alpha={}, constant={:e}), target {} attempts",
            agents, self.params.k, self.params.alpha, self.params.constant, summary.target
        );
        if summary.target == 0 {
            return Ok(summary);
        }

        'passes: loop {
            summary.passes += 1;
            let order = graph.random_order(rng, self.shuffle);

            for agent in order {
                if let Some(partner) = self.pick_partner(graph, agent, rng) {
                    if graph.connect(agent, partner) {
                        summary.edges_added += 1;
                    }
                }

                summary.attempts += 1;
                if summary.attempts >= summary.target {
                    break 'passes;
                }
            }

            debug!(
                "Pass {} complete: {} attempts, {} new edges",
                summary.passes, summary.attempts, summary.edges_added
            );
        }

        info!(
            "Rewiring finished after {} passes: {} attempts, {} new edges, {} edges total",
            summary.passes,
            summary.attempts,
            summary.edges_added,
            graph.edge_count()
        );
        Ok(summary)
    }

    /// Draws one partner for `agent` from its propensity distribution
    fn pick_partner<R: Rng + ?Sized>(&self, graph: &NetworkGraph, agent: NodeId, rng: &mut R) -> Option<NodeId> {
        let mut weights = propensity_vector(graph, agent, &self.params);
        let self_index = agent.index();

        if !normalize(&mut weights) {
            // Unusable weights (e.g. infinite from a negative alpha): any other node
            let others = weights.len().checked_sub(1).filter(|n| *n > 0)?;
            let mut j = rng.gen_range(0..others);
            if j >= self_index {
                j += 1;
            }
            return Some(NodeId(j));
        }

        let u: f64 = rng.gen();
        select_index(&weights, self_index, u).map(NodeId)
    }
}
