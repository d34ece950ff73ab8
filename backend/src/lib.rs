//! ER Simulator Core - Rust Engine
//!
//! Discrete-event simulation of an emergency room: patients arrive at random,
//! wait in a severity-ordered triage queue, are treated by one of several
//! doctors, and leave. The engine reports waiting times, service times and
//! doctor utilization.
//!
//! # Architecture
//!
//! - **core**: Simulation clock and horizon
//! - **rng**: Deterministic random number generation
//! - **variates**: Interarrival, service and severity sampling
//! - **models**: Domain types (Patient, Doctor, audit events)
//! - **resources**: Doctor pool and busy-time accounting
//! - **triage**: Severity-then-FIFO waiting queue
//! - **events**: Future-event calendar
//! - **stats**: Statistics collection and run summary
//! - **orchestrator**: Main event loop, batch runs, config fingerprint
//! - **config**: JSON configuration files
//! - **export**: Summary CSV output
//!
//! # Critical Invariants
//!
//! 1. Simulated time never decreases
//! 2. All randomness is deterministic (seeded RNG)
//! 3. No doctor is idle while a patient waits after an event completes

// Module declarations
pub mod config;
pub mod core;
pub mod events;
pub mod export;
pub mod models;
pub mod orchestrator;
pub mod resources;
pub mod rng;
pub mod stats;
pub mod triage;
pub mod variates;

// Re-exports for convenience
pub use config::{BatchConfig, ConfigError, ErConfig, RunOverride};
pub use crate::core::time::{SimClock, SimTime};
pub use events::{EventCalendar, EventKind, ScheduledEvent};
pub use models::{
    doctor::{Doctor, DoctorId},
    event::{Event, EventLog},
    patient::{Patient, PatientId, Severity},
};
pub use orchestrator::{
    run_batch, RunResult, SimulationConfig, SimulationEngine, SimulationError, StepReport,
};
pub use resources::DoctorPool;
pub use rng::RngManager;
pub use stats::{SimulationSummary, StatisticsCollector};
pub use triage::TriageQueue;
pub use variates::{ExponentialVariates, ScriptedVariates, VariateSource};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn er_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::PyErSimulation>()?;
    Ok(())
}
