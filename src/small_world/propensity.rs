//! Propensity weights and Monte Carlo partner selection.
//!
//! For an agent `A`, every other node `i` gets a weight from the number of
//! neighbours it shares with `A`:
//!
//! | mutual `m`     | propensity                                        |
//! |----------------|---------------------------------------------------|
//! | `0`            | `constant`                                        |
//! | `m >= k`       | `1`                                               |
//! | otherwise      | `((m - 1) / k)^alpha * (1 - constant) + constant` |
//!
//! `A`'s own slot holds [`SELF_SENTINEL`] and is dropped from normalization.

use std::collections::HashSet;

use super::rewirer::SmallWorldParams;
use crate::agent::NodeId;
use crate::topology::NetworkGraph;

/// Marker stored in the selecting agent's own slot
pub const SELF_SENTINEL: f64 = -1.0;

/// Counts entries of `other` that are also in `own`
pub fn mutual_neighbours(own: &HashSet<NodeId>, other: &[NodeId]) -> usize {
    other.iter().filter(|n| own.contains(n)).count()
}

/// Unnormalized weight for a candidate sharing `mutual` neighbours
pub fn propensity(mutual: usize, params: &SmallWorldParams) -> f64 {
    let m = mutual as f64;
    if mutual == 0 {
        params.constant
    } else if m >= params.k {
        1.0
    } else {
        ((m - 1.0) / params.k).powf(params.alpha) * (1.0 - params.constant) + params.constant
    }
}

/// Propensity of `agent` towards every node, indexed in canonical order
pub fn propensity_vector(graph: &NetworkGraph, agent: NodeId, params: &SmallWorldParams) -> Vec<f64> {
    let own: HashSet<NodeId> = graph.neighbours_of(agent).iter().copied().collect();

    graph
        .ids()
        .map(|candidate| {
            if candidate == agent {
                SELF_SENTINEL
            } else {
                propensity(mutual_neighbours(&own, graph.neighbours_of(candidate)), params)
            }
        })
        .collect()
}

/// Scales non-sentinel entries to sum to 1 and zeroes the sentinel.
///
/// Returns false, leaving the weights untouched, if their sum is zero,
/// negative or not finite.
pub fn normalize(weights: &mut [f64]) -> bool {
    let sum: f64 = weights.iter().filter(|w| **w > SELF_SENTINEL).sum();
    if !sum.is_finite() || sum <= 0.0 {
        return false;
    }

    for w in weights.iter_mut() {
        *w = if *w > SELF_SENTINEL { *w / sum } else { 0.0 };
    }
    true
}

/// Picks the first index whose cumulative probability exceeds `u`.
///
/// `probabilities` must already be normalized. The slot at `self_index` is
/// never chosen. If rounding leaves the running total below `u`, the last
/// selectable index is returned. `None` only when nothing is selectable.
pub fn select_index(probabilities: &[f64], self_index: usize, u: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last = None;

    for (j, p) in probabilities.iter().enumerate() {
        if j == self_index {
            continue;
        }
        cumulative += p;
        if u < cumulative {
            return Some(j);
        }
        last = Some(j);
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentNode;

    fn params(k: f64, alpha: f64, constant: f64) -> SmallWorldParams {
        SmallWorldParams { k, alpha, constant }
    }

    #[test]
    fn test_propensity_branches() {
        let p = params(4.0, 2.0, 0.1);
        assert_eq!(propensity(0, &p), 0.1);
        assert_eq!(propensity(4, &p), 1.0);
        assert_eq!(propensity(9, &p), 1.0);
        // m = 1: (0/4)^2 * 0.9 + 0.1
        assert!((propensity(1, &p) - 0.1).abs() < 1e-12);
        // m = 3: (2/4)^2 * 0.9 + 0.1 = 0.325
        assert!((propensity(3, &p) - 0.325).abs() < 1e-12);
    }

    #[test]
    fn test_mutual_neighbours() {
        let own: HashSet<NodeId> = [NodeId(1), NodeId(2), NodeId(3)].into_iter().collect();
        assert_eq!(mutual_neighbours(&own, &[NodeId(2), NodeId(3), NodeId(7)]), 2);
        assert_eq!(mutual_neighbours(&own, &[]), 0);
    }

    #[test]
    fn test_vector_marks_self_with_sentinel() {
        let mut graph = NetworkGraph::new();
        for name in ["a", "b", "c", "d"] {
            graph.add_node(AgentNode::new(name));
        }
        // a-b, a-c, d-b, d-c: a and d share two neighbours
        graph.connect(NodeId(0), NodeId(1));
        graph.connect(NodeId(0), NodeId(2));
        graph.connect(NodeId(3), NodeId(1));
        graph.connect(NodeId(3), NodeId(2));

        let p = params(2.0, 1.0, 0.01);
        let weights = propensity_vector(&graph, NodeId(0), &p);
        assert_eq!(weights.len(), 4);
        assert_eq!(weights[0], SELF_SENTINEL);
        assert_eq!(weights[1], 0.01);
        assert_eq!(weights[2], 0.01);
        assert_eq!(weights[3], 1.0);
    }

    #[test]
    fn test_normalize_zeroes_sentinel() {
        let mut weights = vec![1.0, SELF_SENTINEL, 3.0];
        assert!(normalize(&mut weights));
        assert_eq!(weights, vec![0.25, 0.0, 0.75]);
    }

    #[test]
    fn test_normalize_refuses_degenerate_sums() {
        let mut zeros = vec![0.0, SELF_SENTINEL, 0.0];
        assert!(!normalize(&mut zeros));
        assert_eq!(zeros, vec![0.0, SELF_SENTINEL, 0.0]);

        let mut infinite = vec![f64::INFINITY, SELF_SENTINEL, 1.0];
        assert!(!normalize(&mut infinite));
    }

    #[test]
    fn test_select_index_scans_cumulative() {
        let probs = [0.25, 0.0, 0.5, 0.25];
        assert_eq!(select_index(&probs, 1, 0.0), Some(0));
        assert_eq!(select_index(&probs, 1, 0.3), Some(2));
        assert_eq!(select_index(&probs, 1, 0.8), Some(3));
    }

    #[test]
    fn test_select_index_never_returns_self() {
        // self is last; a shortfall must fall back to the last other index
        let probs = [0.3, 0.3, 0.0];
        assert_eq!(select_index(&probs, 2, 0.99), Some(1));
        assert_eq!(select_index(&[0.0], 0, 0.5), None);
    }
}
