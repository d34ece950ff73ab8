//! Simulation Engine
//!
//! Owns every piece of run state and executes the event loop:
//!
//! ```text
//! start:  reset all state, schedule Arrival at t=0
//! repeat:
//!   1. Peek the earliest event; stop if none or if it lies at/after the horizon
//!   2. Pop it and advance the clock to its time
//!   3. Execute it (Arrival / ServiceEnd / Departure)
//!   4. While a doctor is idle and triage is non-empty, assign the head patient
//!   5. Check: no idle doctor while patients wait
//! finish: close open busy intervals at the horizon, build the summary
//! ```
//!
//! # Determinism
//!
//! All randomness comes from the engine's `VariateSource`, drawn in a fixed
//! order (severity, then service time when served on arrival, then the next
//! interarrival gap). The calendar breaks time ties by insertion order and
//! the pool picks the lowest idle doctor id. Same seed + same config gives
//! bit-identical summaries.
//!
//! # Example
//!
//! ```rust
//! use er_simulator_core::orchestrator::{SimulationConfig, SimulationEngine};
//!
//! let config = SimulationConfig {
//!     arrival_rate_per_hour: 20.0,
//!     service_mean_minutes: 15.0,
//!     num_doctors: 3,
//!     horizon_minutes: 480.0,
//!     random_seed: 42,
//!     output_dir: "runs/demo".to_string(),
//! };
//!
//! let mut engine = SimulationEngine::new(config).unwrap();
//! let result = engine.run().unwrap();
//! println!("avg wait: {}", result.summary.get("avg_wait").unwrap());
//! ```

use crate::core::time::{ClockError, SimClock, SimTime};
use crate::events::{CalendarError, EventCalendar, EventKind, ScheduledEvent};
use crate::export::ExportError;
use crate::models::doctor::DoctorId;
use crate::models::event::{Event, EventLog};
use crate::models::patient::{Patient, PatientError, PatientId};
use crate::orchestrator::fingerprint::compute_config_hash;
use crate::resources::{DoctorPool, PoolError};
use crate::stats::{SimulationSummary, StatisticsCollector};
use crate::triage::TriageQueue;
use crate::variates::{ExponentialVariates, VariateError, VariateSource};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

// ============================================================================
// Configuration Types
// ============================================================================

/// Parameters of one simulation run
///
/// Time unit is minutes throughout. The engine converts the hourly arrival
/// rate and the mean service duration into per-minute rates itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Expected patient arrivals per hour
    pub arrival_rate_per_hour: f64,

    /// Mean treatment duration in minutes
    pub service_mean_minutes: f64,

    /// Number of doctors on shift
    pub num_doctors: u32,

    /// End of the simulated window in minutes
    pub horizon_minutes: f64,

    /// Seed for the variate stream
    pub random_seed: u64,

    /// Directory the exporter writes this run to; doubles as the run id
    pub output_dir: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arrival_rate_per_hour: 20.0,
            service_mean_minutes: 15.0,
            num_doctors: 3,
            horizon_minutes: 8.0 * 60.0,
            random_seed: 42,
            output_dir: "runs".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Arrivals per minute
    pub fn arrival_rate_per_minute(&self) -> f64 {
        self.arrival_rate_per_hour / 60.0
    }

    /// Services per minute (reciprocal of the mean duration)
    pub fn service_rate_per_minute(&self) -> f64 {
        1.0 / self.service_mean_minutes
    }

    /// Identifier used in results: the output directory, or a seed-based
    /// fallback when none is set
    pub fn run_id(&self) -> String {
        if self.output_dir.trim().is_empty() {
            format!("run_seed_{}", self.random_seed)
        } else {
            self.output_dir.clone()
        }
    }

    /// Reject anything that would yield NaN/infinite durations or no doctors
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.arrival_rate_per_hour.is_finite() && self.arrival_rate_per_hour > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "arrival_rate_per_hour must be > 0, got {}",
                self.arrival_rate_per_hour
            )));
        }

        if !(self.service_mean_minutes.is_finite() && self.service_mean_minutes > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "service_mean_minutes must be > 0, got {}",
                self.service_mean_minutes
            )));
        }

        if self.num_doctors == 0 {
            return Err(SimulationError::InvalidConfig(
                "num_doctors must be > 0".to_string(),
            ));
        }

        if !(self.horizon_minutes.is_finite() && self.horizon_minutes >= 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "horizon_minutes must be finite and >= 0, got {}",
                self.horizon_minutes
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Errors and Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Bad parameters; raised before any simulation runs
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Internal consistency failure; the run is aborted
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Writing or reading a summary file failed
    #[error("Export error: {0}")]
    Export(String),
}

impl From<VariateError> for SimulationError {
    fn from(e: VariateError) -> Self {
        SimulationError::InvalidConfig(e.to_string())
    }
}

impl From<PoolError> for SimulationError {
    fn from(e: PoolError) -> Self {
        SimulationError::InvariantViolation(e.to_string())
    }
}

impl From<PatientError> for SimulationError {
    fn from(e: PatientError) -> Self {
        SimulationError::InvariantViolation(e.to_string())
    }
}

impl From<CalendarError> for SimulationError {
    fn from(e: CalendarError) -> Self {
        SimulationError::InvariantViolation(e.to_string())
    }
}

impl From<ClockError> for SimulationError {
    fn from(e: ClockError) -> Self {
        SimulationError::InvariantViolation(e.to_string())
    }
}

impl From<ExportError> for SimulationError {
    fn from(e: ExportError) -> Self {
        SimulationError::Export(e.to_string())
    }
}

/// Outcome of one complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,

    /// SHA-256 of the canonical JSON config
    pub config_hash: String,

    pub summary: SimulationSummary,

    /// Wall-clock duration of the run; kept out of `summary` so summaries
    /// stay bit-identical between runs
    pub wall_seconds: f64,
}

/// What a single `step` executed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub time: SimTime,
    pub kind: EventKind,

    /// Patients handed to doctors during this step (on arrival or by the
    /// post-event assignment loop)
    pub assigned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NotStarted,
    Running,
    /// `step` found no further event inside the horizon
    Drained,
    Finished,
}

// ============================================================================
// Engine
// ============================================================================

pub struct SimulationEngine {
    config: SimulationConfig,
    config_hash: String,
    clock: SimClock,
    calendar: EventCalendar,
    triage: TriageQueue,
    pool: DoctorPool,
    stats: StatisticsCollector,
    variates: Box<dyn VariateSource>,
    /// Arena indexed by `PatientId - 1`; ids are handed out in order
    patients: Vec<Patient>,
    event_log: EventLog,
    state: RunState,
    started_at: Option<Instant>,
}

impl SimulationEngine {
    /// Create an engine drawing exponential variates from `config.random_seed`
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidConfig` if any rate is non-positive, the
    /// horizon is negative or non-finite, or there are no doctors.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let variates = ExponentialVariates::new(
            config.arrival_rate_per_minute(),
            config.service_rate_per_minute(),
            config.random_seed,
        )?;
        Self::with_variates(config, Box::new(variates))
    }

    /// Create an engine with a caller-supplied variate source
    ///
    /// The rates in `config` are still validated but only `variates`
    /// decides the actual durations and severities.
    pub fn with_variates(
        config: SimulationConfig,
        variates: Box<dyn VariateSource>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let config_hash = compute_config_hash(&config)?;

        Ok(Self {
            clock: SimClock::new(config.horizon_minutes),
            pool: DoctorPool::new(config.num_doctors),
            calendar: EventCalendar::new(),
            triage: TriageQueue::new(),
            stats: StatisticsCollector::new(),
            variates,
            patients: Vec::new(),
            event_log: EventLog::new(),
            state: RunState::NotStarted,
            started_at: None,
            config_hash,
            config,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn horizon(&self) -> SimTime {
        self.clock.horizon()
    }

    /// Every patient created so far, in id order
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        let idx = (id.0 as usize).checked_sub(1)?;
        self.patients.get(idx)
    }

    pub fn pool(&self) -> &DoctorPool {
        &self.pool
    }

    pub fn triage(&self) -> &TriageQueue {
        &self.triage
    }

    /// Number of events still pending in the calendar
    pub fn pending_events(&self) -> usize {
        self.calendar.len()
    }

    pub fn stats(&self) -> &StatisticsCollector {
        &self.stats
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// No doctor is idle while a patient waits in triage
    pub fn invariant_holds(&self) -> bool {
        self.triage.is_empty() || self.pool.first_idle().is_none()
    }

    // ========================================================================
    // Run Control
    // ========================================================================

    /// Run from a clean state to the horizon
    pub fn run(&mut self) -> Result<RunResult, SimulationError> {
        self.start()?;
        while self.step()?.is_some() {}
        self.finish()
    }

    /// Reset every structure and schedule the first arrival at t=0
    pub fn start(&mut self) -> Result<(), SimulationError> {
        self.reset();
        self.calendar.schedule(0.0, EventKind::Arrival)?;
        self.stats.observe_queue_length(0.0, 0);
        self.state = RunState::Running;
        self.started_at = Some(Instant::now());

        info!(
            run_id = %self.config.run_id(),
            doctors = self.config.num_doctors,
            arrival_rate_per_hour = self.config.arrival_rate_per_hour,
            service_mean_minutes = self.config.service_mean_minutes,
            horizon_minutes = self.config.horizon_minutes,
            seed = self.config.random_seed,
            "Starting ER simulation"
        );
        Ok(())
    }

    /// Execute the next event, if it lies inside the horizon
    ///
    /// Returns `Ok(None)` once the calendar is exhausted or the next event
    /// is at or after the horizon; that event is left unexecuted.
    pub fn step(&mut self) -> Result<Option<StepReport>, SimulationError> {
        if self.state != RunState::Running {
            return Ok(None);
        }

        let next_time = match self.calendar.peek_time() {
            Some(t) if self.clock.within_horizon(t) => t,
            _ => {
                self.state = RunState::Drained;
                return Ok(None);
            }
        };

        let event = self.calendar.pop_earliest().ok_or_else(|| {
            SimulationError::InvariantViolation(format!(
                "calendar lost the event peeked at {}",
                next_time
            ))
        })?;

        self.execute(event).map_err(|e| {
            error!(time = event.time, kind = event.kind.name(), error = %e, "Aborting run");
            e
        })
    }

    /// Close busy intervals at the horizon and build the run result
    ///
    /// # Errors
    ///
    /// `SimulationError::InvariantViolation` unless `step` has already
    /// returned `Ok(None)`: flushing at the horizon while events inside it
    /// are pending would credit busy time that was never simulated.
    pub fn finish(&mut self) -> Result<RunResult, SimulationError> {
        match self.state {
            RunState::NotStarted => {
                return Err(SimulationError::InvariantViolation(
                    "finish called before start".to_string(),
                ))
            }
            RunState::Running => {
                return Err(SimulationError::InvariantViolation(format!(
                    "finish called mid-run at t={} with {} event(s) pending",
                    self.clock.now(),
                    self.calendar.len()
                )))
            }
            RunState::Drained | RunState::Finished => {}
        }

        let horizon = self.clock.horizon();
        self.pool.flush_at_horizon(horizon)?;
        self.calendar.clear();
        self.state = RunState::Finished;

        let waiting = self.patients.iter().filter(|p| p.is_waiting()).count();
        let in_service = self.patients.iter().filter(|p| p.is_in_service()).count();
        let summary = self.stats.summarize(&self.pool, horizon, waiting, in_service);
        let wall_seconds = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        info!(
            run_id = %self.config.run_id(),
            arrivals = self.stats.arrivals(),
            departures = self.stats.departures(),
            avg_wait = self.stats.wait().mean(),
            waiting_at_horizon = waiting,
            wall_seconds,
            "ER simulation finished"
        );

        Ok(RunResult {
            run_id: self.config.run_id(),
            config_hash: self.config_hash.clone(),
            summary,
            wall_seconds,
        })
    }

    /// Drop all run state; nothing crosses run boundaries
    fn reset(&mut self) {
        self.clock.reset();
        self.calendar.clear();
        self.triage = TriageQueue::new();
        self.pool.reset();
        self.stats.reset();
        self.variates.reset();
        self.patients.clear();
        self.event_log.clear();
        self.started_at = None;
    }

    // ========================================================================
    // Event Execution
    // ========================================================================

    fn execute(&mut self, event: ScheduledEvent) -> Result<Option<StepReport>, SimulationError> {
        self.clock.advance_to(event.time)?;
        let now = self.clock.now();

        let mut assigned = match event.kind {
            EventKind::Arrival => self.handle_arrival(now)?,
            EventKind::ServiceEnd { patient } => self.handle_service_end(now, patient)?,
            EventKind::Departure { patient } => self.handle_departure(now, patient)?,
        };
        assigned += self.assign_waiting(now)?;

        if !self.invariant_holds() {
            return Err(SimulationError::InvariantViolation(format!(
                "{} idle doctor(s) while {} patient(s) wait at t={}",
                self.pool.idle_count(),
                self.triage.len(),
                now
            )));
        }
        self.stats.observe_queue_length(now, self.triage.len());

        Ok(Some(StepReport {
            time: now,
            kind: event.kind,
            assigned,
        }))
    }

    /// New patient: triage, maybe straight to a doctor, schedule next arrival
    fn handle_arrival(&mut self, now: SimTime) -> Result<usize, SimulationError> {
        let severity = self.variates.next_severity();
        let id = PatientId(self.patients.len() as u64 + 1);
        let patient = Patient::new(id, severity, now);

        self.triage.enqueue(&patient);
        self.stats.record_arrival(&patient);
        self.event_log.log(Event::Arrival {
            time: now,
            patient: id,
            severity: severity.level(),
        });
        debug!(time = now, patient = %id, severity = severity.level(), "Arrival");
        self.patients.push(patient);

        // Serve the queue head, which may be an earlier, more urgent patient.
        let mut assigned = 0;
        if let Some(doctor) = self.pool.first_idle() {
            if let Some(next) = self.triage.dequeue() {
                self.begin_service(next, doctor, now)?;
                assigned += 1;
            }
        }

        let gap = self.variates.next_interarrival();
        self.calendar.schedule(now + gap, EventKind::Arrival)?;
        Ok(assigned)
    }

    /// Treatment over: free the doctor, leave at the same instant
    fn handle_service_end(
        &mut self,
        now: SimTime,
        id: PatientId,
    ) -> Result<usize, SimulationError> {
        let patient = patient_slot(&mut self.patients, id)?;
        patient.finish_service(now)?;
        let doctor = patient.assigned_doctor().ok_or_else(|| {
            SimulationError::InvariantViolation(format!("{} finished service without a doctor", id))
        })?;
        let service_time = patient.service_time().unwrap_or(0.0);

        self.stats.record_service_end(patient);
        self.pool.mark_idle(doctor, now)?;
        self.event_log.log(Event::ServiceEnd {
            time: now,
            patient: id,
            doctor,
            service_time,
        });
        debug!(time = now, patient = %id, doctor = %doctor, service_time, "Service end");

        self.calendar.schedule(now, EventKind::Departure { patient: id })?;
        Ok(0)
    }

    fn handle_departure(&mut self, now: SimTime, id: PatientId) -> Result<usize, SimulationError> {
        let patient = patient_slot(&mut self.patients, id)?;
        patient.depart(now)?;
        let time_in_system = patient.time_in_system().unwrap_or(0.0);

        self.stats.record_departure(patient);
        self.event_log.log(Event::Departure {
            time: now,
            patient: id,
            time_in_system,
        });
        debug!(time = now, patient = %id, time_in_system, "Departure");
        Ok(0)
    }

    /// Drain triage into idle doctors, lowest doctor id first
    fn assign_waiting(&mut self, now: SimTime) -> Result<usize, SimulationError> {
        let mut assigned = 0;
        while let Some(doctor) = self.pool.first_idle() {
            let Some(next) = self.triage.dequeue() else {
                break;
            };
            self.begin_service(next, doctor, now)?;
            assigned += 1;
        }
        Ok(assigned)
    }

    fn begin_service(
        &mut self,
        id: PatientId,
        doctor: DoctorId,
        now: SimTime,
    ) -> Result<(), SimulationError> {
        self.pool.mark_busy(doctor, now)?;
        let patient = patient_slot(&mut self.patients, id)?;
        patient.start_service(now, doctor)?;
        let wait = patient.wait_time().unwrap_or(0.0);
        let severity = patient.severity().level();

        self.stats.record_service_start(patient);
        self.event_log.log(Event::ServiceStart {
            time: now,
            patient: id,
            severity,
            doctor,
            wait,
        });
        debug!(time = now, patient = %id, doctor = %doctor, wait, "Service start");

        let duration = self.variates.next_service_duration();
        self.calendar
            .schedule(now + duration, EventKind::ServiceEnd { patient: id })?;
        Ok(())
    }
}

fn patient_slot(patients: &mut [Patient], id: PatientId) -> Result<&mut Patient, SimulationError> {
    (id.0 as usize)
        .checked_sub(1)
        .and_then(|idx| patients.get_mut(idx))
        .ok_or_else(|| SimulationError::InvariantViolation(format!("unknown {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variates::ScriptedVariates;

    fn config(doctors: u32, horizon: f64) -> SimulationConfig {
        SimulationConfig {
            num_doctors: doctors,
            horizon_minutes: horizon,
            output_dir: "runs/test".to_string(),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut c = config(1, 10.0);
        c.arrival_rate_per_hour = 0.0;
        assert!(matches!(c.validate(), Err(SimulationError::InvalidConfig(_))));

        let mut c = config(1, 10.0);
        c.service_mean_minutes = -3.0;
        assert!(matches!(c.validate(), Err(SimulationError::InvalidConfig(_))));

        let c = config(0, 10.0);
        assert!(matches!(
            SimulationEngine::new(c),
            Err(SimulationError::InvalidConfig(_))
        ));

        let c = config(1, f64::INFINITY);
        assert!(matches!(c.validate(), Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_rate_conversions() {
        let c = SimulationConfig::default();
        assert!((c.arrival_rate_per_minute() - 1.0 / 3.0).abs() < 1e-12);
        assert!((c.service_rate_per_minute() - 1.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_id_falls_back_to_seed() {
        let mut c = config(1, 10.0);
        c.output_dir = String::new();
        c.random_seed = 77;
        assert_eq!(c.run_id(), "run_seed_77");
    }

    #[test]
    fn test_step_before_start_does_nothing() {
        let mut engine = SimulationEngine::new(config(1, 10.0)).unwrap();
        assert_eq!(engine.step().unwrap(), None);
        assert!(engine.finish().is_err());
    }

    #[test]
    fn test_finish_requires_drained_calendar() {
        let variates = ScriptedVariates::constant(100.0, 30.0, 1).unwrap();
        let mut engine =
            SimulationEngine::with_variates(config(1, 50.0), Box::new(variates)).unwrap();
        engine.start().unwrap();
        engine.step().unwrap();

        // ServiceEnd at t=30 is still pending inside the horizon
        assert!(matches!(
            engine.finish(),
            Err(SimulationError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_export_error_converts() {
        let err: SimulationError = ExportError::Malformed {
            path: "runs/summary.csv".into(),
            reason: "bad header".to_string(),
        }
        .into();
        match err {
            SimulationError::Export(msg) => assert!(msg.contains("bad header")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_service_end_and_departure_share_instant() {
        let variates = ScriptedVariates::constant(100.0, 4.0, 3).unwrap();
        let mut engine =
            SimulationEngine::with_variates(config(1, 50.0), Box::new(variates)).unwrap();
        engine.run().unwrap();

        let p = engine.patient(PatientId(1)).unwrap();
        assert_eq!(p.service_end(), Some(4.0));
        assert_eq!(p.departure_time(), Some(4.0));
    }
}
