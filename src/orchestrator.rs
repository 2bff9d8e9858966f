//! Simulation orchestrator.
//!
//! A [`Session`] owns the parameters, the graph and the random source for
//! one simulation, and tells registered observers about every state change.
//! Presentation layers hold no state of their own: they react to a
//! [`SessionEvent`] and re-read the graph through [`Session::graph`].
//!
//! [`run_from_config`] drives the whole pipeline for the command line:
//! build or import, rewire, run, then write the registry and reports.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::agent::{Behavior, NodeId};
use crate::analysis::{analyze_network, generate_json_report, generate_text_report, ReportMetadata, SimulationReport};
use crate::config::{Config, SimulationParameters};
use crate::registry::{export_registry, import_graph, load_registry, write_registry, AgentRegistry};
use crate::scheduler::SimulationScheduler;
use crate::small_world::{RewireError, RewireSummary, SmallWorldParams, SmallWorldRewirer};
use crate::topology::{initialize_ring, NetworkGraph};
use crate::utils::validate_graph_invariants;

/// Something that changed in a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The graph was replaced by a fresh ring
    RingBuilt { agents: usize },
    /// The graph was replaced by an imported registry
    Imported { agents: usize, edges: usize },
    Rewired(RewireSummary),
    /// Zero-based round that just finished
    RoundCompleted { round: usize },
    RunCompleted { rounds: usize, visits: usize },
}

/// Receives session events together with the graph as it is afterwards
pub trait SessionObserver {
    fn on_event(&mut self, event: &SessionEvent, graph: &NetworkGraph);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionEvent, &NetworkGraph),
{
    fn on_event(&mut self, event: &SessionEvent, graph: &NetworkGraph) {
        self(event, graph)
    }
}

/// Where the current graph came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSource {
    Ring,
    Registry,
}

/// One simulation: parameters, graph, random source and observers
pub struct Session {
    params: SimulationParameters,
    graph: NetworkGraph,
    rng: StdRng,
    seed: u64,
    source: GraphSource,
    observers: Vec<Box<dyn SessionObserver>>,
}

/// Creates a seeded RNG, drawing a seed from entropy when none is given
fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    (StdRng::seed_from_u64(seed), seed)
}

fn notify(observers: &mut [Box<dyn SessionObserver>], event: &SessionEvent, graph: &NetworkGraph) {
    for observer in observers.iter_mut() {
        observer.on_event(event, graph);
    }
}

impl Session {
    /// Session over a fresh ring of `params.agents` nodes
    pub fn new(params: SimulationParameters, seed: Option<u64>) -> Self {
        let (mut rng, seed) = seeded_rng(seed);
        let graph = initialize_ring(params.agents, params.width, params.height, &mut rng);
        info!("Session seeded with {}", seed);

        Self {
            params,
            graph,
            rng,
            seed,
            source: GraphSource::Ring,
            observers: Vec::new(),
        }
    }

    /// Session over an imported registry; the agent count follows the import
    pub fn from_registry(mut params: SimulationParameters, registry: &AgentRegistry, seed: Option<u64>) -> Self {
        let (mut rng, seed) = seeded_rng(seed);
        let graph = import_graph(&registry.agents, params.width, params.height, &mut rng);
        params.agents = graph.len();
        info!("Session seeded with {}", seed);

        Self {
            params,
            graph,
            rng,
            seed,
            source: GraphSource::Registry,
            observers: Vec::new(),
        }
    }

    pub fn add_observer<O: SessionObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    /// Seed actually in use, including one drawn from entropy
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn source(&self) -> &GraphSource {
        &self.source
    }

    /// Changes the agent count; a different count rebuilds the ring
    pub fn set_agent_count(&mut self, agents: usize) {
        if agents == self.params.agents {
            return;
        }
        info!("Agent count changed from {} to {}", self.params.agents, agents);
        self.params.agents = agents;
        self.regenerate_ring();
    }

    /// Geographic field size; used by the next ring build or import
    pub fn set_geography(&mut self, width: u32, height: u32) {
        self.params.width = width;
        self.params.height = height;
    }

    /// Stores rewiring parameters after checking their ranges
    pub fn set_small_world(&mut self, small_world: SmallWorldParams) -> Result<(), RewireError> {
        small_world.validate(2)?;
        self.params.k = small_world.k;
        self.params.alpha = small_world.alpha;
        self.params.constant = small_world.constant;
        Ok(())
    }

    pub fn set_runs(&mut self, runs: usize) {
        self.params.runs = runs;
    }

    /// Gives one node its own behavior instead of the session default
    pub fn set_node_behavior(&mut self, id: NodeId, behavior: Arc<dyn Behavior>) {
        self.graph.set_behavior(id, behavior);
    }

    /// Replaces the graph with a fresh ring of the current agent count
    pub fn regenerate_ring(&mut self) {
        self.graph = initialize_ring(self.params.agents, self.params.width, self.params.height, &mut self.rng);
        self.source = GraphSource::Ring;
        let event = SessionEvent::RingBuilt {
            agents: self.graph.len(),
        };
        notify(&mut self.observers, &event, &self.graph);
    }

    /// Replaces the graph with an imported registry
    pub fn import(&mut self, registry: &AgentRegistry) {
        self.graph = import_graph(&registry.agents, self.params.width, self.params.height, &mut self.rng);
        self.params.agents = self.graph.len();
        self.source = GraphSource::Registry;
        let event = SessionEvent::Imported {
            agents: self.graph.len(),
            edges: self.graph.edge_count(),
        };
        notify(&mut self.observers, &event, &self.graph);
    }

    /// Adds small-world shortcuts with the current parameters
    pub fn rewire(&mut self) -> Result<RewireSummary, RewireError> {
        let rewirer = SmallWorldRewirer::new(self.params.small_world()).with_shuffle(self.params.shuffle);
        let summary = rewirer.rewire(&mut self.graph, &mut self.rng)?;
        notify(&mut self.observers, &SessionEvent::Rewired(summary), &self.graph);
        Ok(summary)
    }

    /// Runs the configured number of rounds; returns the number of agent updates
    pub fn run(&mut self) -> usize {
        let scheduler = SimulationScheduler::new(self.params.runs)
            .with_shuffle(self.params.shuffle)
            .with_default_behavior(self.params.behavior.build());

        let observers = &mut self.observers;
        let visits = scheduler.run_with_observer(&mut self.graph, &mut self.rng, |round, graph| {
            notify(observers, &SessionEvent::RoundCompleted { round }, graph);
        });

        let event = SessionEvent::RunCompleted {
            rounds: self.params.runs,
            visits,
        };
        notify(&mut self.observers, &event, &self.graph);
        visits
    }

    /// Snapshot of every node in registry form
    pub fn export(&self) -> AgentRegistry {
        export_registry(&self.graph)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("params", &self.params)
            .field("seed", &self.seed)
            .field("source", &self.source)
            .field("agents", &self.graph.len())
            .field("edges", &self.graph.edge_count())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Outcome of [`run_from_config`]
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub visits: usize,
    pub output_dir: PathBuf,
    pub report: SimulationReport,
}

/// Builds or imports the graph, rewires it if configured, runs the rounds
/// and writes `agents.json`, `report.json` and `report.txt` to `output_dir`
pub fn run_from_config(config: &Config, output_dir: &Path) -> Result<RunSummary> {
    let params = config.parameters();

    let mut session = match &config.network.import {
        Some(path) => {
            let registry = load_registry(Path::new(path))?;
            Session::from_registry(params, &registry, config.general.seed)
        }
        None => Session::new(params, config.general.seed),
    };

    session.add_observer(|event: &SessionEvent, graph: &NetworkGraph| {
        debug!("{:?} ({} agents, {} edges)", event, graph.len(), graph.edge_count());
    });

    let rewiring = match config.small_world {
        Some(small_world) => {
            session
                .set_small_world(small_world)
                .wrap_err("Invalid small-world parameters")?;
            Some(session.rewire().wrap_err("Rewiring failed")?)
        }
        None => {
            info!("No small_world section, keeping the initial topology");
            None
        }
    };

    validate_graph_invariants(session.graph()).map_err(|e| eyre!("Graph invariant violated: {}", e))?;

    let visits = session.run();

    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    write_registry(&session.export(), &output_dir.join("agents.json"))?;

    let source = match &config.network.import {
        Some(path) => path.clone(),
        None => "ring".to_string(),
    };
    let report = SimulationReport {
        metadata: ReportMetadata {
            source,
            seed: Some(session.seed()),
            rounds: session.parameters().runs,
            shuffle: session.parameters().shuffle.as_str().to_string(),
            behavior: session.parameters().behavior.as_str().to_string(),
        },
        rewiring,
        network: analyze_network(session.graph()),
    };

    generate_json_report(&report, &output_dir.join("report.json"))?;
    generate_text_report(&report, &output_dir.join("report.txt"))?;

    Ok(RunSummary {
        seed: session.seed(),
        visits,
        output_dir: output_dir.to_path_buf(),
        report,
    })
}
