//! Orchestrator - main simulation loop
//!
//! Ties the clock, calendar, triage queue, doctor pool and statistics
//! together. See `engine.rs` for the event loop.

pub mod batch;
pub mod engine;
pub mod fingerprint;

pub use batch::{run_batch, run_single};
pub use engine::{RunResult, SimulationConfig, SimulationEngine, SimulationError, StepReport};
pub use fingerprint::{compute_config_hash, verify_config_hash};
