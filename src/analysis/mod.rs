//! Topology analysis for agent graphs.
//!
//! Computes degree, clustering, path-length and connectivity metrics and
//! writes them as JSON and text reports.

pub mod network_graph;
pub mod report;

pub use network_graph::{analyze_network, find_connected_components, generate_dot, NetworkGraphReport};
pub use report::{generate_json_report, generate_text_report, ReportMetadata, SimulationReport};
