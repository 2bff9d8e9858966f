//! # Smallworld - Agent networks with propensity-weighted small-world rewiring
//!
//! This library builds graphs of agents, turns them into small-world
//! networks following Watts' propensity model, and runs simple agent
//! behaviors over them in randomized rounds.
//!
//! ## Overview
//!
//! A simulation starts from either a ring of `n` agents or an imported node
//! list. Rewiring then adds shortcuts: each agent draws a partner with a
//! probability that depends on how many neighbours the two share, tuned by
//! `k`, `alpha` and `constant`. Finally the scheduler updates every agent
//! once per round, in a fresh random order each time.
//!
//! ## Key Features
//!
//! - **Ring construction**: Circular graph-space layout and random geographic placement
//! - **Small-world rewiring**: Attempt-counted, stops at `floor(k * n / 2)`
//! - **Pluggable behavior**: Per-agent `Behavior` trait objects with a neighbour-count default
//! - **Import/export**: JSON or YAML node lists with neighbour names
//! - **Analysis**: Degree, clustering, path-length and connectivity reports
//! - **Reproducible**: A single seed drives every random draw
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `agent`: Node data, handles and the behavior trait
//! - `topology`: The graph arena, ring construction and shuffling
//! - `small_world`: Propensity computation and the rewirer
//! - `scheduler`: Round-based behavior execution
//! - `registry`: Node-list ingestion and export
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `config_loader`: Configuration file loading and CLI overrides
//! - `analysis`: Topology metrics and report generation
//! - `utils`: Graph invariant validation
//! - `orchestrator`: The `Session` type and the end-to-end pipeline
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use smallworld::{config_loader, orchestrator};
//! use std::path::Path;
//!
//! // Load configuration from YAML file
//! let config = config_loader::load_config(Path::new("smallworld.yaml"))?;
//!
//! // Build, rewire, run and write reports
//! let summary = orchestrator::run_from_config(&config, Path::new("smallworld_output"))?;
//!
//! // The smallworld_output directory now contains:
//! // - agents.json: Final node list with values and neighbours
//! // - report.json / report.txt: Topology analysis
//! println!("seed {}", summary.seed);
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   seed: 42
//!   log_level: info
//!
//! network:
//!   agents: 10
//!   width: 300
//!   height: 400
//!   # import: "nodes.json"
//!
//! small_world:
//!   k: 4.0
//!   alpha: 15.0
//!   constant: 1.0e-10
//!
//! simulation:
//!   runs: 10
//!   shuffle: uniform          # uniform | legacy
//!   behavior: neighbour_count # neighbour_count | neighbour_mean
//! ```
//!
//! ## Error Handling
//!
//! Precondition failures are typed (`ValidationError`, `RewireError`).
//! Functions that touch the filesystem return `color_eyre::eyre::Result`
//! with context attached.

pub mod agent;
pub mod analysis;
pub mod config;
pub mod config_loader;
pub mod orchestrator;
pub mod registry;
pub mod scheduler;
pub mod small_world;
pub mod topology;
pub mod utils;
