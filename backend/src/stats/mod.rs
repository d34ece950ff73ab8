//! Statistics collection
//!
//! The collector is fed by the engine as events execute and turns its
//! running totals into a `SimulationSummary` once the run ends.
//!
//! Samples are recorded at the moment they become known:
//! - wait time when service starts
//! - service time when service ends
//! - time in system on departure
//!
//! Patients still waiting or in service at the horizon therefore contribute
//! nothing partial. Averages over empty samples are defined as zero.

pub mod summary;

pub use summary::{SimulationSummary, SummaryBuilder};

use crate::core::SimTime;
use crate::models::patient::{Patient, Severity};
use crate::resources::DoctorPool;
use serde::{Deserialize, Serialize};

/// Running count / sum / max of a non-negative sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    count: u64,
    sum: f64,
    max: f64,
}

impl SampleStats {
    pub fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        if value > self.max {
            self.max = value;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Largest sample, 0 when empty
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Arithmetic mean, 0 when empty
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Time-weighted queue length tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct QueueLengthStats {
    last_change: SimTime,
    current: usize,
    area: f64,
    max: usize,
}

impl QueueLengthStats {
    fn observe(&mut self, now: SimTime, len: usize) {
        if now > self.last_change {
            self.area += self.current as f64 * (now - self.last_change);
            self.last_change = now;
        }
        self.current = len;
        self.max = self.max.max(len);
    }
}

/// Per-severity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct SeverityStats {
    arrivals: u64,
    wait: SampleStats,
}

/// Accumulates everything the summary reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsCollector {
    arrivals: u64,
    departures: u64,
    wait: SampleStats,
    service: SampleStats,
    time_in_system: SampleStats,
    queue: QueueLengthStats,
    by_severity: [SeverityStats; 5],
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self, patient: &Patient) {
        self.arrivals += 1;
        self.severity_mut(patient.severity()).arrivals += 1;
    }

    /// Record the wait sample of a patient whose service just started
    pub fn record_service_start(&mut self, patient: &Patient) {
        if let Some(wait) = patient.wait_time() {
            self.wait.record(wait);
            self.severity_mut(patient.severity()).wait.record(wait);
        }
    }

    /// Record the service sample of a patient whose service just ended
    pub fn record_service_end(&mut self, patient: &Patient) {
        if let Some(service) = patient.service_time() {
            self.service.record(service);
        }
    }

    pub fn record_departure(&mut self, patient: &Patient) {
        self.departures += 1;
        if let Some(total) = patient.time_in_system() {
            self.time_in_system.record(total);
        }
    }

    /// Note the triage queue length after an event has been fully processed
    pub fn observe_queue_length(&mut self, now: SimTime, len: usize) {
        self.queue.observe(now, len);
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn departures(&self) -> u64 {
        self.departures
    }

    pub fn wait(&self) -> &SampleStats {
        &self.wait
    }

    pub fn service(&self) -> &SampleStats {
        &self.service
    }

    pub fn time_in_system(&self) -> &SampleStats {
        &self.time_in_system
    }

    pub fn max_queue_length(&self) -> usize {
        self.queue.max
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build the end-of-run summary
    ///
    /// `pool` must already be flushed at the horizon so busy totals cover
    /// every interval.
    pub fn summarize(
        &self,
        pool: &DoctorPool,
        horizon: SimTime,
        waiting_at_horizon: usize,
        in_service_at_horizon: usize,
    ) -> SimulationSummary {
        let mut queue = self.queue;
        queue.observe(horizon, waiting_at_horizon);
        let avg_queue_length = if horizon > 0.0 {
            queue.area / horizon
        } else {
            0.0
        };

        let mut builder = SimulationSummary::builder()
            .count(summary::TOTAL_ARRIVALS, self.arrivals)
            .count(summary::TOTAL_SERVICE_STARTS, self.wait.count())
            .count(summary::TOTAL_DEPARTURES, self.departures)
            .decimal(summary::AVG_WAIT, self.wait.mean())
            .decimal(summary::MAX_WAIT, self.wait.max())
            .decimal(summary::AVG_SERVICE, self.service.mean())
            .decimal(summary::AVG_TIME_IN_SYSTEM, self.time_in_system.mean())
            .decimal(summary::AVG_QUEUE_LENGTH, avg_queue_length)
            .count(summary::MAX_QUEUE_LENGTH, queue.max as u64)
            .count(summary::WAITING_AT_HORIZON, waiting_at_horizon as u64)
            .count(summary::IN_SERVICE_AT_HORIZON, in_service_at_horizon as u64)
            .decimal(summary::SIM_MINUTES, horizon);

        for doctor in pool.iter() {
            let id = doctor.id().0;
            let utilization = if horizon > 0.0 {
                doctor.busy_minutes() / horizon
            } else {
                0.0
            };
            builder = builder
                .decimal(summary::doctor_busy_key(id), doctor.busy_minutes())
                .decimal(summary::doctor_utilization_key(id), utilization)
                .count(summary::doctor_served_key(id), doctor.patients_served());
        }

        for (stats, level) in self.by_severity.iter().zip(Severity::LEVELS) {
            builder = builder
                .count(summary::severity_arrivals_key(level), stats.arrivals)
                .decimal(summary::severity_avg_wait_key(level), stats.wait.mean());
        }

        builder.build()
    }

    fn severity_mut(&mut self, severity: Severity) -> &mut SeverityStats {
        &mut self.by_severity[(severity.level() - Severity::MOST_URGENT) as usize]
    }
}
