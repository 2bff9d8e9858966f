//! Topology analysis for an agent graph.
//!
//! Provides a read-only summary of a [`NetworkGraph`]:
//! - Degree distribution and summary statistics
//! - Mean local clustering coefficient
//! - Characteristic path length over reachable pairs
//! - Connected components and isolated nodes
//! - Small-world coefficient against a random graph of the same density
//! - GraphViz DOT output for visualization

use std::collections::{BTreeMap, HashSet, VecDeque};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::NodeId;
use crate::topology::NetworkGraph;

/// Full topology analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkGraphReport {
    /// RFC 3339 time the report was produced
    pub generated_at: String,
    pub total_nodes: usize,
    pub total_edges: usize,

    /// Degree -> number of nodes with that degree
    pub degree_histogram: BTreeMap<usize, usize>,
    pub degree_stats: DegreeStats,

    /// Mean of the per-node clustering coefficients (nodes with degree < 2 count as 0)
    pub clustering_coefficient: f64,
    /// Mean shortest-path length over ordered pairs that can reach each other
    pub average_path_length: f64,
    /// Longest finite shortest path
    pub diameter: usize,

    pub connected_components: usize,
    pub largest_component: usize,
    pub isolated_nodes: Vec<String>,

    /// `(C / C_rand) / (L / L_rand)`; absent when the random baseline is undefined
    pub small_world_sigma: Option<f64>,

    pub value_stats: ValueStats,

    pub findings: Vec<String>,
}

/// Statistical summary of degrees
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DegreeStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Statistical summary of agent values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum: f64,
}

/// Analyze the topology and values of `graph`
pub fn analyze_network(graph: &NetworkGraph) -> NetworkGraphReport {
    let degrees: Vec<usize> = graph.ids().map(|id| graph.degree(id)).collect();

    let mut degree_histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for degree in &degrees {
        *degree_histogram.entry(*degree).or_insert(0) += 1;
    }
    let degree_stats = calculate_stats(&degrees);

    let ids: Vec<NodeId> = graph.ids().collect();

    let clustering_coefficient = if ids.is_empty() {
        0.0
    } else {
        ids.par_iter()
            .map(|id| local_clustering(graph, *id))
            .sum::<f64>()
            / ids.len() as f64
    };

    // One BFS per source: (sum of distances, reachable targets, eccentricity)
    let (distance_sum, pair_count, diameter) = ids
        .par_iter()
        .map(|id| path_lengths_from(graph, *id))
        .reduce(|| (0, 0, 0), |a, b| (a.0 + b.0, a.1 + b.1, a.2.max(b.2)));

    let average_path_length = if pair_count == 0 {
        0.0
    } else {
        distance_sum as f64 / pair_count as f64
    };

    let components = find_connected_components(graph);
    let largest_component = components.iter().map(Vec::len).max().unwrap_or(0);

    let isolated_nodes: Vec<String> = graph
        .iter()
        .filter(|(_, node)| node.degree() == 0)
        .map(|(_, node)| node.name.clone())
        .collect();

    let small_world_sigma = small_world_sigma(
        graph.len(),
        degree_stats.mean,
        clustering_coefficient,
        average_path_length,
    );

    let value_stats = calculate_value_stats(graph);

    let mut report = NetworkGraphReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_nodes: graph.len(),
        total_edges: graph.edge_count(),
        degree_histogram,
        degree_stats,
        clustering_coefficient,
        average_path_length,
        diameter,
        connected_components: components.len(),
        largest_component,
        isolated_nodes,
        small_world_sigma,
        value_stats,
        findings: Vec::new(),
    };
    report.findings = summarize_findings(&report);
    report
}

/// Fraction of a node's neighbour pairs that are themselves connected
fn local_clustering(graph: &NetworkGraph, id: NodeId) -> f64 {
    let neighbours = graph.neighbours_of(id);
    let degree = neighbours.len();
    if degree < 2 {
        return 0.0;
    }

    let mut links = 0usize;
    for (i, a) in neighbours.iter().enumerate() {
        for b in &neighbours[i + 1..] {
            if graph.are_connected(*a, *b) {
                links += 1;
            }
        }
    }

    let possible = degree * (degree - 1) / 2;
    links as f64 / possible as f64
}

/// BFS from `source`: (sum of distances, reachable node count, max distance)
fn path_lengths_from(graph: &NetworkGraph, source: NodeId) -> (usize, usize, usize) {
    let mut distance: Vec<Option<usize>> = vec![None; graph.len()];
    distance[source.index()] = Some(0);

    let mut queue = VecDeque::from([source]);
    let (mut sum, mut reached, mut eccentricity) = (0, 0, 0);

    while let Some(node) = queue.pop_front() {
        let Some(d) = distance[node.index()] else {
            continue;
        };
        for next in graph.neighbours_of(node) {
            if distance[next.index()].is_none() {
                let dn = d + 1;
                distance[next.index()] = Some(dn);
                sum += dn;
                reached += 1;
                eccentricity = eccentricity.max(dn);
                queue.push_back(*next);
            }
        }
    }

    (sum, reached, eccentricity)
}

/// Connected components as lists of node ids, in order of their lowest id
pub fn find_connected_components(graph: &NetworkGraph) -> Vec<Vec<NodeId>> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut components: Vec<Vec<NodeId>> = Vec::new();

    for start in graph.ids() {
        if visited.contains(&start) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            component.push(node);

            for neighbour in graph.neighbours_of(node) {
                if !visited.contains(neighbour) {
                    stack.push(*neighbour);
                }
            }
        }

        component.sort();
        components.push(component);
    }

    components
}

/// Humphries-Gurney sigma using Erdos-Renyi estimates for the baseline
fn small_world_sigma(nodes: usize, mean_degree: f64, clustering: f64, path_length: f64) -> Option<f64> {
    if nodes < 3 || mean_degree <= 1.0 || path_length <= 0.0 {
        return None;
    }

    let n = nodes as f64;
    let random_clustering = mean_degree / n;
    let random_path_length = n.ln() / mean_degree.ln();
    if random_clustering <= 0.0 || random_path_length <= 0.0 {
        return None;
    }

    Some((clustering / random_clustering) / (path_length / random_path_length))
}

/// Calculate statistical summary
fn calculate_stats(values: &[usize]) -> DegreeStats {
    if values.is_empty() {
        return DegreeStats::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let sum: usize = sorted.iter().sum();
    let mean = sum as f64 / sorted.len() as f64;

    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
    } else {
        sorted[sorted.len() / 2] as f64
    };

    let variance: f64 = sorted
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / sorted.len() as f64;

    DegreeStats {
        min,
        max,
        mean,
        median,
        std_dev: variance.sqrt(),
    }
}

fn calculate_value_stats(graph: &NetworkGraph) -> ValueStats {
    if graph.is_empty() {
        return ValueStats::default();
    }

    let values = graph.nodes().iter().map(|node| node.value);
    let (min, max, sum) = values.fold((f64::INFINITY, f64::NEG_INFINITY, 0.0), |(lo, hi, sum), v| {
        (lo.min(v), hi.max(v), sum + v)
    });

    ValueStats {
        min,
        max,
        mean: sum / graph.len() as f64,
        sum,
    }
}

fn summarize_findings(report: &NetworkGraphReport) -> Vec<String> {
    let mut findings = Vec::new();

    if report.connected_components > 1 {
        findings.push(format!(
            "Graph is partitioned into {} components (largest has {} nodes)",
            report.connected_components, report.largest_component
        ));
    }

    if !report.isolated_nodes.is_empty() {
        findings.push(format!(
            "{} nodes are isolated (no neighbours)",
            report.isolated_nodes.len()
        ));
    }

    if let Some(sigma) = report.small_world_sigma {
        if sigma > 1.0 {
            findings.push(format!("Small-world structure detected (sigma = {:.2})", sigma));
        } else {
            findings.push(format!("No small-world structure (sigma = {:.2})", sigma));
        }
    }

    if findings.is_empty() {
        findings.push("Graph is connected".to_string());
    }

    findings
}

/// Escapes a string for use inside a quoted DOT ID
fn dot_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Generate GraphViz DOT format for visualization, placing nodes at their graph-space positions
pub fn generate_dot(graph: &NetworkGraph) -> String {
    let mut dot = String::new();
    dot.push_str("graph SmallWorld {\n");
    dot.push_str("    layout=neato;\n");
    dot.push_str("    node [shape=circle];\n\n");

    for (_, node) in graph.iter() {
        let color = if node.degree() == 0 { "red" } else { "lightblue" };
        let position = if node.graph.is_placed() {
            format!(", pos=\"{},{}!\"", node.graph.x, node.graph.y)
        } else {
            String::new()
        };

        let name = dot_escape(&node.name);
        dot.push_str(&format!(
            "    \"{}\" [label=\"{}\\n{}\", fillcolor={}, style=filled{}];\n",
            name, name, node.value, color, position
        ));
    }

    dot.push('\n');

    for (id, node) in graph.iter() {
        for neighbour in node.neighbours() {
            // Each undirected edge once
            if id < *neighbour {
                if let Some(other) = graph.node(*neighbour) {
                    dot.push_str(&format!(
                        "    \"{}\" -- \"{}\";\n",
                        dot_escape(&node.name),
                        dot_escape(&other.name)
                    ));
                }
            }
        }
    }

    dot.push_str("}\n");
    dot
}
