//! Network topology module.
//!
//! This module contains the agent graph itself, ring construction and
//! default placement, and the shuffle used to randomize traversal order.

pub mod graph;
pub mod ring;
pub mod shuffle;

// Re-export key types and functions for easier access
pub use graph::NetworkGraph;
pub use ring::{circle_position, fill_default_positions, initialize_ring, layout_radius, GRAPH_MARGIN};
pub use shuffle::{shuffle_in_place, ShuffleMode};
