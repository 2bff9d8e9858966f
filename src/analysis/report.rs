//! Report generation for graph analysis.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use super::network_graph::NetworkGraphReport;
use crate::small_world::RewireSummary;

/// Everything written after a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub metadata: ReportMetadata,
    /// Present when the graph was rewired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewiring: Option<RewireSummary>,
    pub network: NetworkGraphReport,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// "ring" or the registry path the graph was imported from
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub rounds: usize,
    pub shuffle: String,
    pub behavior: String,
}

/// Generate JSON report
pub fn generate_json_report(report: &SimulationReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Render the human-readable report
pub fn render_text_report(report: &SimulationReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    let network = &report.network;

    // Header
    lines.push("=".repeat(80));
    lines.push("                      SMALL-WORLD NETWORK ANALYSIS".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    // Metadata
    lines.push(format!("Analysis Date: {}", network.generated_at));
    lines.push(format!("Graph Source: {}", report.metadata.source));
    match report.metadata.seed {
        Some(seed) => lines.push(format!("Seed: {}", seed)),
        None => lines.push("Seed: (entropy)".to_string()),
    }
    lines.push(format!(
        "Rounds: {} ({} shuffle, {} behavior)",
        report.metadata.rounds, report.metadata.shuffle, report.metadata.behavior
    ));
    lines.push(String::new());

    if let Some(ref rewiring) = report.rewiring {
        lines.push("=".repeat(80));
        lines.push("                             REWIRING".to_string());
        lines.push("=".repeat(80));
        lines.push(String::new());
        lines.push(format!("  Target attempts: {}", rewiring.target));
        lines.push(format!("  Attempts made:   {}", rewiring.attempts));
        lines.push(format!("  New edges:       {}", rewiring.edges_added));
        lines.push(format!("  Passes:          {}", rewiring.passes));
        lines.push(String::new());
    }

    lines.push("=".repeat(80));
    lines.push("                             TOPOLOGY".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("  Nodes: {}", network.total_nodes));
    lines.push(format!("  Edges: {}", network.total_edges));
    lines.push(String::new());

    lines.push("Degree Distribution:".to_string());
    lines.push(format!(
        "  Min: {}, Max: {}, Mean: {:.2}, Median: {:.1}, Std dev: {:.2}",
        network.degree_stats.min,
        network.degree_stats.max,
        network.degree_stats.mean,
        network.degree_stats.median,
        network.degree_stats.std_dev
    ));
    for (degree, count) in &network.degree_histogram {
        lines.push(format!("  {:>4}: {}", degree, count));
    }
    lines.push(String::new());

    lines.push("Structure:".to_string());
    lines.push(format!("  Clustering coefficient: {:.4}", network.clustering_coefficient));
    lines.push(format!("  Average path length:    {:.4}", network.average_path_length));
    lines.push(format!("  Diameter:               {}", network.diameter));
    if let Some(sigma) = network.small_world_sigma {
        lines.push(format!("  Small-world sigma:      {:.3}", sigma));
    }
    lines.push(format!(
        "  Connected components:   {} (largest: {})",
        network.connected_components, network.largest_component
    ));
    if !network.isolated_nodes.is_empty() {
        lines.push(format!("  Isolated nodes: {}", network.isolated_nodes.join(", ")));
    }
    lines.push(String::new());

    lines.push("Agent Values:".to_string());
    lines.push(format!(
        "  Min: {}, Max: {}, Mean: {:.3}, Sum: {}",
        network.value_stats.min, network.value_stats.max, network.value_stats.mean, network.value_stats.sum
    ));
    lines.push(String::new());

    lines.push("Findings:".to_string());
    for finding in &network.findings {
        lines.push(format!("  - {}", finding));
    }
    lines.push(String::new());

    // Footer
    lines.push("=".repeat(80));

    lines.join("\n")
}

/// Generate human-readable text report
pub fn generate_text_report(report: &SimulationReport, output_path: &Path) -> Result<()> {
    let content = render_text_report(report);
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &SimulationReport) {
    let network = &report.network;
    println!("\n=== SMALL-WORLD NETWORK SUMMARY ===\n");
    println!("Nodes: {}", network.total_nodes);
    println!("Edges: {}", network.total_edges);
    println!("Mean degree: {:.2}", network.degree_stats.mean);
    println!("Clustering: {:.4}", network.clustering_coefficient);
    println!("Path length: {:.4}", network.average_path_length);
    if let Some(sigma) = network.small_world_sigma {
        println!("Sigma: {:.3}", sigma);
    }
    println!("Components: {}", network.connected_components);
    println!();
}
