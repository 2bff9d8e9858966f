//! Round-based simulation scheduler.
//!
//! A run is a fixed number of rounds. Each round draws a fresh random order
//! and updates every node exactly once through its behavior (the node's own
//! if it carries one, the scheduler default otherwise). Updates are applied
//! in place, so later visits in a round see the values written by earlier
//! ones.

use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use rand::Rng;

use crate::agent::{AgentContext, Behavior, NeighbourCount};
use crate::topology::{NetworkGraph, ShuffleMode};

/// Runs agent behaviors over a graph in randomized rounds
#[derive(Clone)]
pub struct SimulationScheduler {
    runs: usize,
    shuffle: ShuffleMode,
    default_behavior: Arc<dyn Behavior>,
}

impl SimulationScheduler {
    /// Scheduler for `runs` rounds with the neighbour-count default behavior
    pub fn new(runs: usize) -> Self {
        Self {
            runs,
            shuffle: ShuffleMode::default(),
            default_behavior: Arc::new(NeighbourCount),
        }
    }

    pub fn with_shuffle(mut self, shuffle: ShuffleMode) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Behavior used for nodes that do not carry their own
    pub fn with_default_behavior(mut self, behavior: Arc<dyn Behavior>) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// Runs every round; returns the number of node updates performed
    pub fn run<R: Rng + ?Sized>(&self, graph: &mut NetworkGraph, rng: &mut R) -> usize {
        self.run_with_observer(graph, rng, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `on_round(round, graph)` after each round
    pub fn run_with_observer<R, F>(&self, graph: &mut NetworkGraph, rng: &mut R, mut on_round: F) -> usize
    where
        R: Rng + ?Sized,
        F: FnMut(usize, &NetworkGraph),
    {
        if graph.is_empty() {
            info!("Graph is empty, skipping {} rounds", self.runs);
            return 0;
        }

        info!(
            "Running {} rounds over {} agents (default behavior: {})",
            self.runs,
            graph.len(),
            self.default_behavior.name()
        );

        let mut visits = 0;
        for round in 0..self.runs {
            visits += self.run_round(graph, rng);
            on_round(round, graph);
        }

        info!("Completed {} rounds, {} agent updates", self.runs, visits);
        visits
    }

    /// One round: every node updated once in a fresh random order
    pub fn run_round<R: Rng + ?Sized>(&self, graph: &mut NetworkGraph, rng: &mut R) -> usize {
        let order = graph.random_order(rng, self.shuffle);
        let mut visits = 0;

        for id in order {
            let behavior = graph
                .node(id)
                .and_then(|node| node.behavior().cloned())
                .unwrap_or_else(|| Arc::clone(&self.default_behavior));

            let Some(mut agent) = AgentContext::new(graph, id) else {
                continue;
            };
            behavior.update(&mut agent);
            visits += 1;
        }

        debug!("Round complete: {} agents updated", visits);
        visits
    }
}

impl fmt::Debug for SimulationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationScheduler")
            .field("runs", &self.runs)
            .field("shuffle", &self.shuffle)
            .field("default_behavior", &self.default_behavior.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentNode, NeighbourMean, NodeId};
    use crate::topology::initialize_ring;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Records the order nodes are visited in
    struct Recorder(Mutex<Vec<NodeId>>);

    impl Behavior for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn update(&self, agent: &mut AgentContext<'_>) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(agent.id());
            }
        }
    }

    #[test]
    fn test_ring_of_four_one_round() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut graph = initialize_ring(4, 300, 400, &mut rng);
        let visits = SimulationScheduler::new(1).run(&mut graph, &mut rng);

        assert_eq!(visits, 4);
        for node in graph.nodes() {
            assert_eq!(node.value, 2.0);
        }
    }

    #[test]
    fn test_node_with_three_neighbours_gets_three() {
        let mut graph = NetworkGraph::new();
        let hub = graph.add_node(AgentNode::new("hub"));
        for name in ["a", "b", "c"] {
            let leaf = graph.add_node(AgentNode::new(name));
            graph.connect(hub, leaf);
        }

        let mut rng = StdRng::seed_from_u64(0);
        SimulationScheduler::new(1).run(&mut graph, &mut rng);
        assert_eq!(graph.node(hub).unwrap().value, 3.0);
    }

    #[test]
    fn test_every_node_visited_once_per_round() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut graph = initialize_ring(9, 300, 400, &mut rng);
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let scheduler = SimulationScheduler::new(3)
            .with_shuffle(ShuffleMode::Legacy)
            .with_default_behavior(recorder.clone());

        let mut rounds_seen = Vec::new();
        let visits = scheduler.run_with_observer(&mut graph, &mut rng, |round, _| rounds_seen.push(round));
        assert_eq!(visits, 27);
        assert_eq!(rounds_seen, vec![0, 1, 2]);

        let seen = recorder.0.lock().unwrap().clone();
        for round in seen.chunks(9) {
            let mut ids = round.to_vec();
            ids.sort();
            assert_eq!(ids, graph.ids().collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_each_round_draws_a_fresh_order() {
        for mode in [ShuffleMode::Uniform, ShuffleMode::Legacy] {
            let mut rng = StdRng::seed_from_u64(33);
            let mut graph = initialize_ring(9, 300, 400, &mut rng);
            let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
            let scheduler = SimulationScheduler::new(10)
                .with_shuffle(mode)
                .with_default_behavior(recorder.clone());

            assert_eq!(scheduler.run(&mut graph, &mut rng), 90);

            let seen = recorder.0.lock().unwrap().clone();
            let rounds: Vec<&[NodeId]> = seen.chunks(9).collect();
            assert_eq!(rounds.len(), 10);
            assert!(
                rounds.iter().any(|round| *round != rounds[0]),
                "every round reused the same order ({:?})",
                mode
            );
        }
    }

    /// Counts its own visits in the `visits` attribute
    struct VisitCounter;

    impl Behavior for VisitCounter {
        fn name(&self) -> &'static str {
            "visit_counter"
        }

        fn update(&self, agent: &mut AgentContext<'_>) {
            let visits = agent
                .node()
                .attribute("visits")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(0);
            agent.set_attribute("visits", (visits + 1).to_string());
        }
    }

    #[test]
    fn test_behavior_writes_attributes() {
        let mut graph = NetworkGraph::new();
        let counted = graph.add_node(AgentNode::new("counted").with_behavior(Arc::new(VisitCounter)));
        let plain = graph.add_node(AgentNode::new("plain"));
        graph.connect(counted, plain);

        let mut rng = StdRng::seed_from_u64(8);
        SimulationScheduler::new(3).run(&mut graph, &mut rng);

        let counted = graph.node(counted).unwrap();
        assert_eq!(counted.behavior().map(|b| b.name()), Some("visit_counter"));
        assert_eq!(counted.attribute("visits"), Some("3"));
        // The value is left to the behavior, which never touches it
        assert_eq!(counted.value, 0.0);

        let plain = graph.node(plain).unwrap();
        assert!(plain.attributes.is_none());
        assert_eq!(plain.value, 1.0);
    }

    #[test]
    fn test_node_behavior_overrides_default() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut graph = initialize_ring(5, 300, 400, &mut rng);
        for id in graph.ids().collect::<Vec<_>>() {
            graph.set_value(id, 6.0);
        }
        graph.set_behavior(NodeId(0), Arc::new(NeighbourMean));

        SimulationScheduler::new(1).run(&mut graph, &mut rng);
        let others: Vec<f64> = graph.nodes()[1..].iter().map(|n| n.value).collect();
        assert_eq!(others, vec![2.0; 4]);
        // Node 0 averages its two ring neighbours, which hold 6 or 2 depending on visit order
        let mean = graph.node(NodeId(0)).unwrap().value;
        assert!([2.0, 4.0, 6.0].contains(&mean));
    }

    #[test]
    fn test_empty_graph_is_a_no_op() {
        let mut graph = NetworkGraph::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(SimulationScheduler::new(5).run(&mut graph, &mut rng), 0);
    }
}
