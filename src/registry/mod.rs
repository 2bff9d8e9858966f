//! # Agent Registry Module
//!
//! This module converts between a [`NetworkGraph`] and a flat, serializable
//! node list (the "agent registry"). It is the boundary used to save a graph
//! after a run and to load hand-written or previously exported networks.
//!
//! ## Document Format
//!
//! A registry is a list of node records. JSON and YAML are both accepted; the
//! format is chosen from the file extension (`.yaml`/`.yml` for YAML,
//! anything else for JSON).
//!
//! ```json
//! {
//!   "agents": [
//!     {
//!       "name": "Ay",
//!       "value": 2.0,
//!       "x": 120, "y": 40,
//!       "graph_x": 0, "graph_y": 140,
//!       "neighbours": ["Bee", "Dee"],
//!       "attributes": { "colour": "red" }
//!     },
//!     { "name": "Bee", "neighbours": ["Ay"] },
//!     { "name": "Dee" }
//!   ]
//! }
//! ```
//!
//! ## Ingestion Rules
//!
//! - Only `name` is required. Missing coordinates stay at the `-1` sentinel
//!   and are then filled by the default placement policy: a random point in
//!   the geographic field and the node's slot on the graph-space circle.
//! - Coordinates and value may be numbers or numeric strings. Anything that
//!   does not parse is treated as missing, never as an error.
//! - Neighbour names are resolved by exact match against all imported
//!   nodes, first match wins. Edges are made symmetric and existing edges
//!   are skipped. Names that match nothing are ignored.
//!
//! ## Export
//!
//! Export writes every field for every node, including all three axes of
//! both coordinate spaces and the names of all neighbours.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::agent::{AgentNode, NodeId, Position, UNSET};
use crate::topology::{fill_default_positions, NetworkGraph};

/// One node in a registry document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_float", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub z: Option<i32>,
    #[serde(default, alias = "graphX", deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub graph_x: Option<i32>,
    #[serde(default, alias = "graphY", deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub graph_y: Option<i32>,
    #[serde(default, alias = "graphZ", deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub graph_z: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbours: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

impl NodeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_neighbours<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.neighbours = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// A complete node-list document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistry {
    pub agents: Vec<NodeRecord>,
}

/// Numbers, numeric strings, or anything else (treated as missing)
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
    #[allow(dead_code)]
    Other(serde::de::IgnoredAny),
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Int(v) => i32::try_from(v).ok(),
        Loose::Float(v) if v.fract() == 0.0 && v.abs() <= f64::from(i32::MAX) => Some(v as i32),
        Loose::Text(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Int(v) => Some(v as f64),
        Loose::Float(v) => Some(v),
        Loose::Text(s) => s.trim().parse().ok(),
        Loose::Other(_) => None,
    })
}

/// Builds a graph from records, resolving neighbour names.
///
/// Coordinates that were not supplied stay at the sentinel; see
/// [`import_graph`] for the variant that also applies default placement.
pub fn build_graph(records: &[NodeRecord]) -> NetworkGraph {
    let mut graph = NetworkGraph::with_capacity(records.len());

    for record in records {
        let mut node = AgentNode::new(record.name.clone());
        node.geo = Position {
            x: record.x.unwrap_or(UNSET),
            y: record.y.unwrap_or(UNSET),
            z: record.z.unwrap_or(UNSET),
        };
        node.graph = Position {
            x: record.graph_x.unwrap_or(UNSET),
            y: record.graph_y.unwrap_or(UNSET),
            z: record.graph_z.unwrap_or(UNSET),
        };
        node.value = record.value.unwrap_or(0.0);
        node.attributes = record.attributes.clone().filter(|attrs| !attrs.is_empty());
        graph.add_node(node);
    }

    let mut unresolved = 0usize;
    for (index, record) in records.iter().enumerate() {
        for neighbour in record.neighbours.iter().flatten() {
            match graph.find_by_name(neighbour) {
                Some(other) => {
                    graph.connect(NodeId(index), other);
                }
                None => {
                    debug!("Neighbour '{}' of '{}' not found, skipping", neighbour, record.name);
                    unresolved += 1;
                }
            }
        }
    }

    info!(
        "Imported {} agents with {} edges ({} unresolved neighbour names)",
        graph.len(),
        graph.edge_count(),
        unresolved
    );
    graph
}

/// Builds a graph from records and fills any missing x/y coordinates
pub fn import_graph<R: Rng + ?Sized>(
    records: &[NodeRecord],
    geo_width: u32,
    geo_height: u32,
    rng: &mut R,
) -> NetworkGraph {
    let mut graph = build_graph(records);
    fill_default_positions(&mut graph, geo_width, geo_height, rng);
    graph
}

/// Snapshot of every node, in canonical order
pub fn export_registry(graph: &NetworkGraph) -> AgentRegistry {
    let agents = graph
        .iter()
        .map(|(id, node)| NodeRecord {
            name: node.name.clone(),
            value: Some(node.value),
            x: Some(node.geo.x),
            y: Some(node.geo.y),
            z: Some(node.geo.z),
            graph_x: Some(node.graph.x),
            graph_y: Some(node.graph.y),
            graph_z: Some(node.graph.z),
            neighbours: Some(graph.neighbour_names(id).into_iter().map(str::to_string).collect()),
            attributes: node.attributes.clone(),
        })
        .collect();

    AgentRegistry { agents }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Reads a registry document from disk
pub fn load_registry(path: &Path) -> Result<AgentRegistry> {
    info!("Loading agent registry from: {:?}", path);
    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open agent registry '{}'", path.display()))?;

    let registry: AgentRegistry = if is_yaml(path) {
        serde_yaml::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse YAML registry '{}'", path.display()))?
    } else {
        serde_json::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse JSON registry '{}'", path.display()))?
    };

    Ok(registry)
}

/// Writes a registry document to disk
pub fn write_registry(registry: &AgentRegistry, path: &Path) -> Result<()> {
    let content = if is_yaml(path) {
        serde_yaml::to_string(registry).wrap_err("Failed to serialize registry to YAML")?
    } else {
        serde_json::to_string_pretty(registry).wrap_err("Failed to serialize registry to JSON")?
    };

    std::fs::write(path, content)
        .wrap_err_with(|| format!("Failed to write agent registry to {}", path.display()))?;

    info!("Agent registry written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_records() -> Vec<NodeRecord> {
        vec![
            NodeRecord::new("Ay").with_neighbours(["Bee", "Dee"]),
            NodeRecord::new("Bee").with_neighbours(["Ay"]),
            NodeRecord::new("Dee"),
        ]
    }

    #[test]
    fn test_cross_references_resolve_symmetrically() {
        let graph = build_graph(&sample_records());
        let ay = graph.find_by_name("Ay").unwrap();
        let bee = graph.find_by_name("Bee").unwrap();
        let dee = graph.find_by_name("Dee").unwrap();

        assert!(graph.are_connected(ay, bee) && graph.are_connected(bee, ay));
        assert!(graph.are_connected(ay, dee) && graph.are_connected(dee, ay));
        assert!(!graph.are_connected(bee, dee));
        assert_eq!(graph.degree(ay), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_unknown_and_self_references_are_ignored() {
        let records = vec![
            NodeRecord::new("solo").with_neighbours(["ghost", "solo"]),
            NodeRecord::new("other"),
        ];
        let graph = build_graph(&records);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let records = vec![
            NodeRecord::new("hub").with_neighbours(["twin"]),
            NodeRecord::new("twin"),
            NodeRecord::new("twin"),
        ];
        let graph = build_graph(&records);
        assert!(graph.are_connected(NodeId(0), NodeId(1)));
        assert_eq!(graph.degree(NodeId(2)), 0);
    }

    #[test]
    fn test_lenient_coordinates() {
        let json = r#"{"agents": [
            {"name": "a", "x": "12", "y": "oops", "graphX": 3.0, "value": "1.5"},
            {"name": "b", "x": null, "y": 7.25, "value": true}
        ]}"#;
        let registry: AgentRegistry = serde_json::from_str(json).unwrap();
        let a = &registry.agents[0];
        assert_eq!(a.x, Some(12));
        assert_eq!(a.y, None);
        assert_eq!(a.graph_x, Some(3));
        assert_eq!(a.value, Some(1.5));

        let b = &registry.agents[1];
        assert_eq!(b.x, None);
        assert_eq!(b.y, None);
        assert_eq!(b.value, None);
    }

    #[test]
    fn test_import_fills_missing_positions() {
        let mut records = sample_records();
        records[0].x = Some(10);
        records[0].y = Some(20);

        let mut rng = StdRng::seed_from_u64(6);
        let graph = import_graph(&records, 300, 400, &mut rng);
        let ay = graph.node(NodeId(0)).unwrap();
        assert_eq!((ay.geo.x, ay.geo.y), (10, 20));
        for node in graph.nodes() {
            assert!(node.geo.is_placed());
            assert!(node.graph.is_placed());
        }
    }

    #[test]
    fn test_export_includes_every_field() {
        let mut graph = build_graph(&sample_records());
        graph.set_value(NodeId(0), 2.0);
        let registry = export_registry(&graph);

        let ay = &registry.agents[0];
        assert_eq!(ay.name, "Ay");
        assert_eq!(ay.value, Some(2.0));
        assert_eq!(ay.x, Some(UNSET));
        assert_eq!(ay.graph_z, Some(UNSET));
        assert_eq!(ay.neighbours, Some(vec!["Bee".to_string(), "Dee".to_string()]));
        assert_eq!(registry.agents[2].neighbours, Some(vec!["Ay".to_string()]));
    }

    #[test]
    fn test_registry_file_round_trip_preserves_topology() {
        let mut rng = StdRng::seed_from_u64(13);
        let graph = import_graph(&sample_records(), 300, 400, &mut rng);
        let exported = export_registry(&graph);

        for suffix in [".json", ".yaml"] {
            let file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
            write_registry(&exported, file.path()).unwrap();
            let loaded = load_registry(file.path()).unwrap();
            assert_eq!(loaded, exported);

            let rebuilt = build_graph(&loaded.agents);
            assert_eq!(rebuilt.edge_count(), graph.edge_count());
            assert_eq!(rebuilt.nodes()[1].geo, graph.nodes()[1].geo);
        }
    }
}
