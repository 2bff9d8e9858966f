use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use smallworld::analysis::report::print_summary;
use smallworld::config::Config;
use smallworld::config_loader::{self, ConfigOverrides};
use smallworld::orchestrator;

/// Small-world agent network simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation configuration YAML file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the agent registry and reports
    #[arg(short, long, default_value = "smallworld_output")]
    output: PathBuf,

    /// Override the number of agents in the ring
    #[arg(short = 'n', long)]
    agents: Option<usize>,

    /// Override the number of scheduler rounds
    #[arg(short, long)]
    runs: Option<usize>,

    /// Seed for every random draw
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the small-world k (enables rewiring)
    #[arg(short)]
    k: Option<f64>,

    /// Override the small-world alpha (enables rewiring)
    #[arg(long)]
    alpha: Option<f64>,

    /// Override the small-world constant (enables rewiring)
    #[arg(long)]
    constant: Option<f64>,

    /// Import agents from a JSON or YAML node list instead of building a ring
    #[arg(short, long)]
    import: Option<String>,

    /// Skip rewiring even if the configuration enables it
    #[arg(long)]
    no_rewire: bool,

    /// Log level (trace, debug, info, warn, error); overrides general.log_level
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            agents: self.agents,
            runs: self.runs,
            seed: self.seed,
            k: self.k,
            alpha: self.alpha,
            constant: self.constant,
            import: self.import.clone(),
            no_rewire: self.no_rewire,
        }
    }
}

/// The CLI level wins over the configuration file; `info` otherwise
fn resolve_log_level(args: &Args, config: &Config) -> String {
    args.log_level
        .clone()
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| "info".to_string())
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // The file is read first because it may carry the log level
    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => Config::default(),
    };

    let level = resolve_log_level(&args, &config);
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Starting smallworld");
    match &args.config {
        Some(path) => info!("Loaded configuration from: {:?}", path),
        None => info!("No configuration file, using defaults"),
    }

    config_loader::apply_overrides(&mut config, &args.overrides())?;
    info!("Output directory: {:?}", args.output);

    let summary = orchestrator::run_from_config(&config, &args.output)?;

    info!(
        "Run complete (seed {}): {} agent updates, results in {:?}",
        summary.seed, summary.visits, summary.output_dir
    );
    print_summary(&summary.report);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["smallworld", "--config", "test.yaml"]);

        assert_eq!(args.config, Some(PathBuf::from("test.yaml")));
        assert_eq!(args.output, PathBuf::from("smallworld_output"));
        assert!(!args.no_rewire);
    }

    #[test]
    fn test_override_args() {
        let args = Args::parse_from([
            "smallworld",
            "-n", "50",
            "--runs", "3",
            "--seed", "9",
            "-k", "6",
            "--alpha", "2.5",
            "--import", "nodes.json",
        ]);

        let overrides = args.overrides();
        assert_eq!(overrides.agents, Some(50));
        assert_eq!(overrides.runs, Some(3));
        assert_eq!(overrides.seed, Some(9));
        assert_eq!(overrides.k, Some(6.0));
        assert_eq!(overrides.alpha, Some(2.5));
        assert_eq!(overrides.import.as_deref(), Some("nodes.json"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_no_rewire_flag() {
        let args = Args::parse_from(["smallworld", "--no-rewire", "--log-level", "debug"]);
        assert!(args.overrides().no_rewire);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_log_level_resolution() {
        let mut config = Config::default();
        let args = Args::parse_from(["smallworld"]);
        assert_eq!(resolve_log_level(&args, &config), "info");

        config.general.log_level = Some("warn".to_string());
        assert_eq!(resolve_log_level(&args, &config), "warn");

        let args = Args::parse_from(["smallworld", "--log-level", "trace"]);
        assert_eq!(resolve_log_level(&args, &config), "trace");
    }
}
