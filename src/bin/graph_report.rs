//! Topology analysis CLI for exported agent registries.
//!
//! Reads a JSON or YAML node list (for example the `agents.json` written by
//! `smallworld`), optionally rewires it, and writes analysis reports.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};

use smallworld::analysis::{self, report::print_summary, ReportMetadata, SimulationReport};
use smallworld::config::SimulationParameters;
use smallworld::orchestrator::Session;
use smallworld::registry::load_registry;
use smallworld::small_world::SmallWorldParams;

#[derive(Parser)]
#[command(name = "graph-report")]
#[command(about = "Topology analysis for smallworld agent registries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the agent registry (JSON, or YAML by extension)
    #[arg(short, long, default_value = "smallworld_output/agents.json")]
    input: PathBuf,

    /// Output directory for reports
    #[arg(short, long, default_value = "analysis_output")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the registry as-is and write JSON and text reports
    Analyze {
        /// Also write a GraphViz DOT file
        #[arg(long)]
        dot: bool,
    },

    /// Rewire the imported graph first, then analyze it
    Rewire {
        #[arg(short, default_value = "4.0")]
        k: f64,

        #[arg(long, default_value = "15.0")]
        alpha: f64,

        #[arg(long, default_value = "1e-10")]
        constant: f64,

        /// Seed for the rewiring draws
        #[arg(long)]
        seed: Option<u64>,

        /// Write the rewired registry next to the reports
        #[arg(long)]
        export: bool,
    },

    /// Show summary statistics
    Summary,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    // Set thread pool size
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let registry = load_registry(&cli.input)?;
    log::info!("Loaded {} agents from {}", registry.agents.len(), cli.input.display());

    let params = SimulationParameters {
        runs: 0,
        ..SimulationParameters::default()
    };

    match cli.command {
        Commands::Analyze { dot } => {
            let session = Session::from_registry(params, &registry, None);
            let report = build_report(&cli, &session, None);
            write_reports(&cli, &report)?;

            if dot {
                let dot_path = cli.output.join("graph.dot");
                fs::write(&dot_path, analysis::generate_dot(session.graph()))
                    .with_context(|| format!("Failed to write DOT file to {}", dot_path.display()))?;
                log::info!("DOT graph written to {}", dot_path.display());
            }
            print_summary(&report);
        }

        Commands::Rewire {
            k,
            alpha,
            constant,
            seed,
            export,
        } => {
            let mut session = Session::from_registry(params, &registry, seed);
            session
                .set_small_world(SmallWorldParams { k, alpha, constant })
                .context("Invalid small-world parameters")?;
            let summary = session.rewire().context("Rewiring failed")?;

            let report = build_report(&cli, &session, Some(summary));
            write_reports(&cli, &report)?;

            if export {
                smallworld::registry::write_registry(&session.export(), &cli.output.join("agents.json"))?;
            }
            print_summary(&report);
        }

        Commands::Summary => {
            let session = Session::from_registry(params, &registry, None);
            print_summary(&build_report(&cli, &session, None));
        }
    }

    Ok(())
}

fn build_report(
    cli: &Cli,
    session: &Session,
    rewiring: Option<smallworld::small_world::RewireSummary>,
) -> SimulationReport {
    SimulationReport {
        metadata: ReportMetadata {
            source: cli.input.display().to_string(),
            seed: rewiring.map(|_| session.seed()),
            rounds: 0,
            shuffle: session.parameters().shuffle.as_str().to_string(),
            behavior: session.parameters().behavior.as_str().to_string(),
        },
        rewiring,
        network: analysis::analyze_network(session.graph()),
    }
}

fn write_reports(cli: &Cli, report: &SimulationReport) -> Result<()> {
    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory: {}", cli.output.display()))?;

    analysis::generate_json_report(report, &cli.output.join("report.json"))?;
    analysis::generate_text_report(report, &cli.output.join("report.txt"))?;
    Ok(())
}
