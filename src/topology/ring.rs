//! Ring construction and default node placement.
//!
//! A ring world places every agent at a random point of the geographic
//! field and evenly around a circle in graph space, then links each agent to
//! its predecessor and closes the loop. The same placement rules fill in
//! any coordinates missing from imported nodes.

use log::{debug, info};
use rand::Rng;

use super::graph::NetworkGraph;
use crate::agent::{AgentNode, NodeId, Position, UNSET};

/// Gap kept between the graph-space circle and the field edge
pub const GRAPH_MARGIN: i32 = 10;

/// Radius of the graph-space circle for a field of the given width
pub fn layout_radius(geo_width: u32) -> i32 {
    let half = i32::try_from(geo_width / 2).unwrap_or(i32::MAX);
    (half - GRAPH_MARGIN).max(0)
}

/// Graph-space position of the `index`-th of `count` nodes.
///
/// Nodes sit `360 / count` degrees apart, x from the sine and y from the
/// cosine, truncated toward zero.
pub fn circle_position(index: usize, count: usize, radius: i32) -> Position {
    if count == 0 {
        return Position::planar(0, 0);
    }
    let step = 360.0 / count as f64;
    let theta = (index as f64 * step).to_radians();
    let r = f64::from(radius);
    Position::planar((r * theta.sin()) as i32, (r * theta.cos()) as i32)
}

/// Uniform point in `[0, geo_width) x [0, geo_height)`
pub fn random_geo_position<R: Rng + ?Sized>(rng: &mut R, geo_width: u32, geo_height: u32) -> Position {
    Position::planar(random_axis(rng, geo_width), random_axis(rng, geo_height))
}

fn random_axis<R: Rng + ?Sized>(rng: &mut R, extent: u32) -> i32 {
    if extent == 0 {
        return 0;
    }
    i32::try_from(rng.gen_range(0..extent)).unwrap_or(i32::MAX)
}

/// Builds a ring of `n` agents named `Agent-0 .. Agent-(n-1)`.
///
/// `n == 0` yields an empty graph and `n == 1` a single isolated node. With
/// `n == 2` the closing edge coincides with the predecessor edge, leaving
/// one edge.
pub fn initialize_ring<R: Rng + ?Sized>(
    n: usize,
    geo_width: u32,
    geo_height: u32,
    rng: &mut R,
) -> NetworkGraph {
    let radius = layout_radius(geo_width);
    let mut graph = NetworkGraph::with_capacity(n);
    let mut previous: Option<NodeId> = None;

    for i in 0..n {
        let mut node = AgentNode::new(format!("Agent-{}", i));
        node.geo = random_geo_position(rng, geo_width, geo_height);
        node.graph = circle_position(i, n, radius);
        let id = graph.add_node(node);

        if let Some(prev) = previous {
            graph.connect(id, prev);
        }
        if i + 1 == n && n > 1 {
            graph.connect(id, NodeId(0));
        }
        previous = Some(id);
    }

    info!("Built ring of {} agents with {} edges", graph.len(), graph.edge_count());
    graph
}

/// Fills unset coordinates with the default placement policy.
///
/// Geographic x/y get a random point in the field; graph-space x/y get the
/// circle position for the node's canonical index. z axes are left alone.
pub fn fill_default_positions<R: Rng + ?Sized>(
    graph: &mut NetworkGraph,
    geo_width: u32,
    geo_height: u32,
    rng: &mut R,
) {
    let count = graph.len();
    let radius = layout_radius(geo_width);
    let mut filled = 0usize;

    for id in (0..count).map(NodeId) {
        let circle = circle_position(id.index(), count, radius);
        let Some(node) = graph.node_mut(id) else { continue };
        let before = (node.geo, node.graph);

        if node.geo.x == UNSET {
            node.geo.x = random_axis(rng, geo_width);
        }
        if node.geo.y == UNSET {
            node.geo.y = random_axis(rng, geo_height);
        }
        if node.graph.x == UNSET {
            node.graph.x = circle.x;
        }
        if node.graph.y == UNSET {
            node.graph.y = circle.y;
        }

        if before != (node.geo, node.graph) {
            filled += 1;
        }
    }

    debug!("Assigned default positions to {} of {} nodes", filled, count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ring_of_five_has_degree_two() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = initialize_ring(5, 300, 400, &mut rng);
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edge_count(), 5);
        for id in graph.ids() {
            assert_eq!(graph.degree(id), 2, "node {} should have two neighbours", id);
        }
        assert!(graph.are_connected(NodeId(4), NodeId(0)));
        assert!(graph.are_connected(NodeId(2), NodeId(3)));
    }

    #[test]
    fn test_ring_names_are_sequential() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = initialize_ring(3, 300, 400, &mut rng);
        let names: Vec<&str> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Agent-0", "Agent-1", "Agent-2"]);
    }

    #[test]
    fn test_degenerate_rings() {
        let mut rng = StdRng::seed_from_u64(1);

        let empty = initialize_ring(0, 300, 400, &mut rng);
        assert!(empty.is_empty());

        let single = initialize_ring(1, 300, 400, &mut rng);
        assert_eq!(single.len(), 1);
        assert_eq!(single.edge_count(), 0);

        let pair = initialize_ring(2, 300, 400, &mut rng);
        assert_eq!(pair.edge_count(), 1);
        assert_eq!(pair.degree(NodeId(0)), 1);
        assert_eq!(pair.degree(NodeId(1)), 1);
    }

    #[test]
    fn test_geo_positions_within_field() {
        let mut rng = StdRng::seed_from_u64(11);
        let graph = initialize_ring(50, 300, 400, &mut rng);
        for node in graph.nodes() {
            assert!((0..300).contains(&node.geo.x));
            assert!((0..400).contains(&node.geo.y));
            assert_eq!(node.geo.z, UNSET);
        }
    }

    #[test]
    fn test_circle_layout() {
        // width 300 -> radius 140
        assert_eq!(layout_radius(300), 140);
        assert_eq!(layout_radius(10), 0);

        assert_eq!(circle_position(0, 4, 140), Position::planar(0, 140));
        assert_eq!(circle_position(1, 4, 140), Position::planar(140, 0));
        assert_eq!(circle_position(2, 4, 140), Position::planar(0, -140));
        assert_eq!(circle_position(3, 4, 140), Position::planar(-140, 0));
    }

    #[test]
    fn test_fill_default_positions_keeps_existing_values() {
        let mut graph = NetworkGraph::new();
        let mut placed = AgentNode::new("placed");
        placed.geo = Position { x: 5, y: 6, z: 7 };
        placed.graph = Position::planar(8, 9);
        graph.add_node(placed);
        graph.add_node(AgentNode::new("bare"));

        let mut rng = StdRng::seed_from_u64(5);
        fill_default_positions(&mut graph, 300, 400, &mut rng);

        let placed = graph.node(NodeId(0)).unwrap();
        assert_eq!(placed.geo, Position { x: 5, y: 6, z: 7 });
        assert_eq!(placed.graph, Position::planar(8, 9));

        let bare = graph.node(NodeId(1)).unwrap();
        assert!(bare.geo.is_placed());
        assert_eq!(bare.geo.z, UNSET);
        assert_eq!(bare.graph, circle_position(1, 2, 140));
    }
}
