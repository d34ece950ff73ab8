//! Batch execution
//!
//! Runs a list of configs one after another, each on a fresh engine, and
//! collects the results in input order.

use crate::orchestrator::engine::{RunResult, SimulationConfig, SimulationEngine, SimulationError};
use tracing::info;

/// Run a single config to completion on a fresh engine
pub fn run_single(config: SimulationConfig) -> Result<RunResult, SimulationError> {
    SimulationEngine::new(config)?.run()
}

/// Run each config in order
///
/// Stops at the first failing run; its error is returned and later configs
/// are not attempted. Configs are validated up front so a bad entry late in
/// the list fails before any simulation time is spent.
pub fn run_batch(configs: &[SimulationConfig]) -> Result<Vec<RunResult>, SimulationError> {
    for (index, config) in configs.iter().enumerate() {
        config.validate().map_err(|e| match e {
            SimulationError::InvalidConfig(msg) => {
                SimulationError::InvalidConfig(format!("run {}: {}", index + 1, msg))
            }
            other => other,
        })?;
    }

    let mut results = Vec::with_capacity(configs.len());
    for (index, config) in configs.iter().enumerate() {
        let result = run_single(config.clone())?;
        info!(
            run = index + 1,
            total = configs.len(),
            run_id = %result.run_id,
            wall_seconds = result.wall_seconds,
            "Batch run complete"
        );
        results.push(result);
    }
    Ok(results)
}
