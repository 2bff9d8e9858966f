use crate::config::Config;
use crate::small_world::SmallWorldParams;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file.
///
/// Does not log, so it can run before the logger is initialised.
pub fn load_config(config_path: &Path) -> Result<Config> {
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub agents: Option<usize>,
    pub runs: Option<usize>,
    pub seed: Option<u64>,
    pub k: Option<f64>,
    pub alpha: Option<f64>,
    pub constant: Option<f64>,
    pub import: Option<String>,
    /// Skip rewiring even if the file configures it
    pub no_rewire: bool,
}

impl ConfigOverrides {
    fn touches_small_world(&self) -> bool {
        self.k.is_some() || self.alpha.is_some() || self.constant.is_some()
    }
}

/// Apply CLI overrides to a configuration and re-validate it
pub fn apply_overrides(config: &mut Config, overrides: &ConfigOverrides) -> Result<()> {
    if let Some(agents) = overrides.agents {
        info!("Overriding agent count: {}", agents);
        config.network.agents = agents;
    }

    if let Some(runs) = overrides.runs {
        info!("Overriding round count: {}", runs);
        config.simulation.runs = runs;
    }

    if let Some(seed) = overrides.seed {
        info!("Overriding seed: {}", seed);
        config.general.seed = Some(seed);
    }

    if let Some(import) = &overrides.import {
        info!("Overriding graph source with registry: {}", import);
        config.network.import = Some(import.clone());
    }

    if overrides.no_rewire {
        info!("Rewiring disabled from the command line");
        config.small_world = None;
    } else if overrides.touches_small_world() {
        // Setting any small-world value on the command line enables rewiring
        let params = config.small_world.get_or_insert_with(SmallWorldParams::default);
        if let Some(k) = overrides.k {
            params.k = k;
        }
        if let Some(alpha) = overrides.alpha {
            params.alpha = alpha;
        }
        if let Some(constant) = overrides.constant {
            params.constant = constant;
        }
    }

    config.validate()?;

    Ok(())
}
