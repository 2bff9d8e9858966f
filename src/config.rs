use serde::{Deserialize, Serialize};

use crate::agent::BehaviorKind;
use crate::small_world::SmallWorldParams;
use crate::topology::ShuffleMode;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Top-level run configuration that mirrors the YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    /// Rewiring parameters; rewiring is skipped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_world: Option<SmallWorldParams>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(ValidationError::InvalidGeneral(format!(
                    "unknown log_level '{}', expected one of {:?}",
                    level, LOG_LEVELS
                )));
            }
        }

        if self.network.width == 0 || self.network.height == 0 {
            return Err(ValidationError::InvalidNetwork(format!(
                "field must have a positive size, got {}x{}",
                self.network.width, self.network.height
            )));
        }
        if let Some(path) = &self.network.import {
            if path.trim().is_empty() {
                return Err(ValidationError::InvalidNetwork(
                    "import path cannot be empty".to_string(),
                ));
            }
        }

        if let Some(params) = &self.small_world {
            // Parameter ranges first; the agent count check only applies to rings
            params
                .validate(2)
                .map_err(|e| ValidationError::InvalidSmallWorld(e.to_string()))?;
            if !self.is_import() {
                params
                    .validate(self.network.agents)
                    .map_err(|e| ValidationError::InvalidSmallWorld(e.to_string()))?;
            }
        }

        Ok(())
    }

    /// True when the graph comes from a registry file instead of a ring
    pub fn is_import(&self) -> bool {
        self.network.import.is_some()
    }

    /// Flat parameter set consumed by the session
    pub fn parameters(&self) -> SimulationParameters {
        let small_world = self.small_world.unwrap_or_default();
        SimulationParameters {
            agents: self.network.agents,
            width: self.network.width,
            height: self.network.height,
            runs: self.simulation.runs,
            k: small_world.k,
            alpha: small_world.alpha,
            constant: small_world.constant,
            shuffle: self.simulation.shuffle,
            behavior: self.simulation.behavior,
        }
    }
}

/// Shared general configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seed for every random draw; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Geographic field and graph source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Ring size; ignored when `import` is set
    pub agents: usize,
    pub width: u32,
    pub height: u32,
    /// Registry document to ingest instead of building a ring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            agents: 10,
            width: 300,
            height: 400,
            import: None,
        }
    }
}

/// Scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub runs: usize,
    pub shuffle: ShuffleMode,
    pub behavior: BehaviorKind,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 10,
            shuffle: ShuffleMode::default(),
            behavior: BehaviorKind::default(),
        }
    }
}

/// Flat parameter set: everything the session needs, nothing about files
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    pub agents: usize,
    pub width: u32,
    pub height: u32,
    pub runs: usize,
    pub k: f64,
    pub alpha: f64,
    pub constant: f64,
    pub shuffle: ShuffleMode,
    pub behavior: BehaviorKind,
}

impl SimulationParameters {
    pub fn small_world(&self) -> SmallWorldParams {
        SmallWorldParams {
            k: self.k,
            alpha: self.alpha,
            constant: self.constant,
        }
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Config::default().parameters()
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid network configuration: {0}")]
    InvalidNetwork(String),
    #[error("Invalid small_world configuration: {0}")]
    InvalidSmallWorld(String),
}
