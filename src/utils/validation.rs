//! Graph consistency checks.
//!
//! This module provides validation functions for the structural
//! invariants every reachable graph state must satisfy.

use std::collections::HashSet;

use crate::topology::NetworkGraph;

/// Validate the adjacency invariants of a graph
///
/// Checks for:
/// - Neighbour handles that point outside the graph
/// - Self-loops
/// - Duplicate entries in a neighbour list
/// - Asymmetric edges (A lists B but B does not list A)
///
/// # Arguments
/// * `graph` - The graph to validate
///
/// # Returns
/// * `Ok(())` if validation succeeds
/// * `Err(String)` with an error message naming the first offending node
///
/// # Examples
/// ```
/// use smallworld::topology::initialize_ring;
/// use smallworld::utils::validation::validate_graph_invariants;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let graph = initialize_ring(6, 300, 400, &mut rng);
/// assert!(validate_graph_invariants(&graph).is_ok());
/// ```
pub fn validate_graph_invariants(graph: &NetworkGraph) -> Result<(), String> {
    for (id, node) in graph.iter() {
        let mut seen = HashSet::new();

        for neighbour in node.neighbours() {
            if neighbour.index() >= graph.len() {
                return Err(format!(
                    "Node '{}' ({}) lists neighbour {} outside a graph of {} nodes",
                    node.name,
                    id,
                    neighbour,
                    graph.len()
                ));
            }

            if *neighbour == id {
                return Err(format!("Node '{}' ({}) is connected to itself", node.name, id));
            }

            if !seen.insert(*neighbour) {
                return Err(format!(
                    "Node '{}' ({}) lists neighbour {} more than once",
                    node.name, id, neighbour
                ));
            }

            if !graph.neighbours_of(*neighbour).contains(&id) {
                return Err(format!(
                    "Edge {} -> {} has no reverse entry (node '{}')",
                    id, neighbour, node.name
                ));
            }
        }
    }

    Ok(())
}
