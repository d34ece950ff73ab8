//! File-level configuration
//!
//! `ErConfig` is what users write to disk: it speaks in hours and carries
//! defaults for every field, so a partial JSON file is valid. The engine
//! consumes the minute-based `SimulationConfig` produced by
//! `ErConfig::to_simulation_config`.
//!
//! # Example
//!
//! ```rust
//! use er_simulator_core::config::ErConfig;
//!
//! let config = ErConfig::from_json_str(r#"{"num_doctors": 5}"#).unwrap();
//! assert_eq!(config.num_doctors, 5);
//! assert_eq!(config.arrival_rate_per_hour, 20.0);
//!
//! let sim = config.to_simulation_config();
//! assert_eq!(sim.horizon_minutes, 480.0);
//! ```

use crate::orchestrator::{SimulationConfig, SimulationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] SimulationError),
}

// ============================================================================
// Single-run configuration
// ============================================================================

/// ER model parameters as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErConfig {
    pub arrival_rate_per_hour: f64,
    pub service_mean_minutes: f64,
    pub num_doctors: u32,
    /// Length of the simulated shift in hours
    pub sim_hours: f64,
    pub random_seed: u64,
    pub output_dir: String,
}

impl Default for ErConfig {
    fn default() -> Self {
        Self {
            arrival_rate_per_hour: 20.0,
            service_mean_minutes: 15.0,
            num_doctors: 3,
            sim_hours: 8.0,
            random_seed: 42,
            output_dir: "runs".to_string(),
        }
    }
}

impl ErConfig {
    /// Load from a JSON file
    ///
    /// A missing file is not an error: defaults are returned and a warning
    /// is logged. An unreadable or malformed file is.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Convert to the engine's minute-based config
    pub fn to_simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            arrival_rate_per_hour: self.arrival_rate_per_hour,
            service_mean_minutes: self.service_mean_minutes,
            num_doctors: self.num_doctors,
            horizon_minutes: self.sim_hours * 60.0,
            random_seed: self.random_seed,
            output_dir: self.output_dir.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_simulation_config().validate()?;
        Ok(())
    }
}

// ============================================================================
// Batch configuration
// ============================================================================

/// Per-run changes applied on top of a batch's base config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOverride {
    pub arrival_rate_per_hour: Option<f64>,
    pub num_doctors: Option<u32>,
    pub service_mean_minutes: Option<f64>,
    pub sim_hours: Option<f64>,
    pub random_seed: Option<u64>,
    pub output_dir: Option<String>,
}

impl RunOverride {
    pub fn apply(&self, base: &ErConfig) -> ErConfig {
        ErConfig {
            arrival_rate_per_hour: self
                .arrival_rate_per_hour
                .unwrap_or(base.arrival_rate_per_hour),
            service_mean_minutes: self
                .service_mean_minutes
                .unwrap_or(base.service_mean_minutes),
            num_doctors: self.num_doctors.unwrap_or(base.num_doctors),
            sim_hours: self.sim_hours.unwrap_or(base.sim_hours),
            random_seed: self.random_seed.unwrap_or(base.random_seed),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| base.output_dir.clone()),
        }
    }
}

/// A base config plus a list of overrides, one per run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub base: ErConfig,
    pub runs: Vec<RunOverride>,
}

impl BatchConfig {
    /// Load from a JSON file; unlike `ErConfig`, the file must exist
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The ten-run demonstration sweep over load and staffing levels
    ///
    /// Each run keeps `base.sim_hours` and writes to
    /// `<base.output_dir>/run_NN`.
    pub fn demo_sweep(base: ErConfig) -> Self {
        // (arrivals/hr, doctors, service mean, seed)
        const SWEEP: [(f64, u32, f64, u64); 10] = [
            (20.0, 2, 15.0, 101),
            (30.0, 2, 15.0, 102),
            (40.0, 3, 12.0, 103),
            (25.0, 3, 20.0, 104),
            (50.0, 4, 10.0, 105),
            (15.0, 2, 18.0, 106),
            (35.0, 3, 14.0, 107),
            (60.0, 5, 8.0, 108),
            (10.0, 1, 30.0, 109),
            (80.0, 6, 7.0, 110),
        ];

        let runs = SWEEP
            .iter()
            .enumerate()
            .map(|(i, &(arrivals, doctors, service_mean, seed))| RunOverride {
                arrival_rate_per_hour: Some(arrivals),
                num_doctors: Some(doctors),
                service_mean_minutes: Some(service_mean),
                sim_hours: None,
                random_seed: Some(seed),
                output_dir: Some(format!("{}/run_{:02}", base.output_dir, i + 1)),
            })
            .collect();

        Self { base, runs }
    }

    /// Resolved file-level configs, one per run
    pub fn resolved(&self) -> Vec<ErConfig> {
        self.runs.iter().map(|run| run.apply(&self.base)).collect()
    }

    /// Engine configs, one per run, each validated
    pub fn simulation_configs(&self) -> Result<Vec<SimulationConfig>, ConfigError> {
        self.resolved()
            .iter()
            .map(|config| {
                let sim = config.to_simulation_config();
                sim.validate()?;
                Ok(sim)
            })
            .collect()
    }
}
