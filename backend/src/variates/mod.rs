//! Random variate generation for arrivals, service times and triage severity.
//!
//! The engine never samples randomness directly; it asks a `VariateSource`.
//! Production runs use `ExponentialVariates` (seeded, inverse-CDF sampling).
//! Scenario tests plug in `ScriptedVariates` to pin every draw.
//!
//! # Key Principles
//!
//! 1. **Determinism**: same seed + same call order → same variates
//! 2. **Fail fast**: a non-positive rate is rejected at construction, so
//!    no draw can ever produce NaN or infinite durations
//!
//! # Example
//!
//! ```
//! use er_simulator_core::variates::{ExponentialVariates, VariateSource};
//!
//! // 20 arrivals/hour = 1/3 per minute, mean service 15 min = 1/15 per minute
//! let mut source = ExponentialVariates::new(20.0 / 60.0, 1.0 / 15.0, 42).unwrap();
//! let gap = source.next_interarrival();
//! assert!(gap >= 0.0 && gap.is_finite());
//! ```

use crate::models::patient::Severity;
use crate::rng::RngManager;
use thiserror::Error;

/// Errors raised while configuring a variate source
#[derive(Debug, Error, PartialEq)]
pub enum VariateError {
    #[error("{name} rate must be positive and finite, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("Scripted {name} sequence must not be empty")]
    EmptySequence { name: &'static str },

    #[error("Scripted {name} value must be finite and non-negative, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("Scripted severity {0} outside 1..=5")]
    InvalidSeverity(u8),

    /// A cycle of zero gaps never advances the clock, so the run never ends
    #[error("Scripted interarrival sequence must contain a positive value")]
    NoPositiveInterarrival,
}

/// Supplier of every random quantity the engine consumes
///
/// Implementations must be deterministic for a fixed construction and
/// call order, and `reset` must rewind them to their initial state so an
/// engine can be re-run without carrying state across runs.
pub trait VariateSource: Send {
    /// Minutes until the next patient arrives
    fn next_interarrival(&mut self) -> f64;

    /// Minutes a doctor spends with one patient
    fn next_service_duration(&mut self) -> f64;

    /// Triage severity of a newly arrived patient
    fn next_severity(&mut self) -> Severity;

    /// Rewind to the initial state
    fn reset(&mut self);
}

/// Exponential interarrival and service times from a seeded stream
#[derive(Debug, Clone)]
pub struct ExponentialVariates {
    arrival_rate: f64,
    service_rate: f64,
    rng: RngManager,
}

impl ExponentialVariates {
    /// Create a source
    ///
    /// # Arguments
    ///
    /// * `arrival_rate` - Arrivals per minute
    /// * `service_rate` - Services per minute (reciprocal of mean duration)
    /// * `seed` - Seed for the underlying xorshift stream
    pub fn new(arrival_rate: f64, service_rate: f64, seed: u64) -> Result<Self, VariateError> {
        validate_rate("arrival", arrival_rate)?;
        validate_rate("service", service_rate)?;

        Ok(Self {
            arrival_rate,
            service_rate,
            rng: RngManager::new(seed),
        })
    }

    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    /// Inverse-CDF exponential sample: `-ln(1 - u) / rate`
    ///
    /// `u` lies in `[0, 1)`, so `1 - u` is in `(0, 1]` and the logarithm is
    /// always finite.
    fn exponential(&mut self, rate: f64) -> f64 {
        let u = self.rng.next_f64();
        -(1.0 - u).ln() / rate
    }
}

impl VariateSource for ExponentialVariates {
    fn next_interarrival(&mut self) -> f64 {
        self.exponential(self.arrival_rate)
    }

    fn next_service_duration(&mut self) -> f64 {
        self.exponential(self.service_rate)
    }

    fn next_severity(&mut self) -> Severity {
        let level = self.rng.range(Severity::MOST_URGENT as i64, Severity::LEAST_URGENT as i64 + 1);
        Severity::clamped(level as u8)
    }

    fn reset(&mut self) {
        self.rng.reseed();
    }
}

fn validate_rate(name: &'static str, value: f64) -> Result<(), VariateError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VariateError::InvalidRate { name, value })
    }
}

/// Fixed, cycling sequences of variates
///
/// Each sequence wraps around when exhausted, so a single-element script
/// yields a constant stream.
///
/// # Example
///
/// ```
/// use er_simulator_core::variates::{ScriptedVariates, VariateSource};
///
/// let mut source = ScriptedVariates::new(vec![5.0], vec![3.0], vec![2]).unwrap();
/// assert_eq!(source.next_interarrival(), 5.0);
/// assert_eq!(source.next_interarrival(), 5.0);
/// assert_eq!(source.next_service_duration(), 3.0);
/// assert_eq!(source.next_severity().level(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedVariates {
    interarrivals: Vec<f64>,
    services: Vec<f64>,
    severities: Vec<Severity>,
    interarrival_pos: usize,
    service_pos: usize,
    severity_pos: usize,
}

impl ScriptedVariates {
    pub fn new(
        interarrivals: Vec<f64>,
        services: Vec<f64>,
        severities: Vec<u8>,
    ) -> Result<Self, VariateError> {
        validate_durations("interarrival", &interarrivals)?;
        if interarrivals.iter().all(|gap| *gap == 0.0) {
            return Err(VariateError::NoPositiveInterarrival);
        }
        validate_durations("service", &services)?;
        if severities.is_empty() {
            return Err(VariateError::EmptySequence { name: "severity" });
        }
        let severities = severities
            .into_iter()
            .map(|level| Severity::new(level).ok_or(VariateError::InvalidSeverity(level)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            interarrivals,
            services,
            severities,
            interarrival_pos: 0,
            service_pos: 0,
            severity_pos: 0,
        })
    }

    /// Constant interarrival and service times, all patients of one severity
    pub fn constant(interarrival: f64, service: f64, severity: u8) -> Result<Self, VariateError> {
        Self::new(vec![interarrival], vec![service], vec![severity])
    }
}

fn cycle<T: Copy>(values: &[T], pos: &mut usize) -> T {
    let value = values[*pos % values.len()];
    *pos += 1;
    value
}

fn validate_durations(name: &'static str, values: &[f64]) -> Result<(), VariateError> {
    if values.is_empty() {
        return Err(VariateError::EmptySequence { name });
    }
    match values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        Some(&value) => Err(VariateError::InvalidDuration { name, value }),
        None => Ok(()),
    }
}

impl VariateSource for ScriptedVariates {
    fn next_interarrival(&mut self) -> f64 {
        cycle(&self.interarrivals, &mut self.interarrival_pos)
    }

    fn next_service_duration(&mut self) -> f64 {
        cycle(&self.services, &mut self.service_pos)
    }

    fn next_severity(&mut self) -> Severity {
        cycle(&self.severities, &mut self.severity_pos)
    }

    fn reset(&mut self) {
        self.interarrival_pos = 0;
        self.service_pos = 0;
        self.severity_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_rates() {
        assert_eq!(
            ExponentialVariates::new(0.0, 1.0, 1).unwrap_err(),
            VariateError::InvalidRate { name: "arrival", value: 0.0 }
        );
        assert!(ExponentialVariates::new(1.0, -2.0, 1).is_err());
        assert!(ExponentialVariates::new(f64::NAN, 1.0, 1).is_err());
        assert!(ExponentialVariates::new(1.0, f64::INFINITY, 1).is_err());
    }

    #[test]
    fn test_exponential_mean_close_to_reciprocal_rate() {
        let mut source = ExponentialVariates::new(0.5, 0.25, 99).unwrap();
        let n = 20_000;
        let mean_gap: f64 = (0..n).map(|_| source.next_interarrival()).sum::<f64>() / n as f64;
        let mean_service: f64 =
            (0..n).map(|_| source.next_service_duration()).sum::<f64>() / n as f64;

        assert!((mean_gap - 2.0).abs() < 0.1, "mean gap {}", mean_gap);
        assert!((mean_service - 4.0).abs() < 0.2, "mean service {}", mean_service);
    }

    #[test]
    fn test_severity_covers_all_levels() {
        let mut source = ExponentialVariates::new(1.0, 1.0, 5).unwrap();
        let mut seen = [false; 5];
        for _ in 0..500 {
            let level = source.next_severity().level();
            assert!((1..=5).contains(&level));
            seen[(level - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "not every severity drawn: {:?}", seen);
    }

    #[test]
    fn test_reset_replays_identical_stream() {
        let mut source = ExponentialVariates::new(1.0 / 3.0, 1.0 / 15.0, 42).unwrap();
        let first: Vec<f64> = (0..10).map(|_| source.next_interarrival()).collect();

        source.reset();
        let second: Vec<f64> = (0..10).map(|_| source.next_interarrival()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_scripted_cycles_and_resets() {
        let mut source = ScriptedVariates::new(vec![1.0, 2.0], vec![3.0], vec![5, 1]).unwrap();
        assert_eq!(source.next_interarrival(), 1.0);
        assert_eq!(source.next_interarrival(), 2.0);
        assert_eq!(source.next_interarrival(), 1.0);
        assert_eq!(source.next_severity().level(), 5);
        assert_eq!(source.next_severity().level(), 1);

        source.reset();
        assert_eq!(source.next_interarrival(), 1.0);
        assert_eq!(source.next_severity().level(), 5);
    }

    #[test]
    fn test_scripted_validation() {
        assert_eq!(
            ScriptedVariates::new(vec![], vec![1.0], vec![1]).unwrap_err(),
            VariateError::EmptySequence { name: "interarrival" }
        );
        assert_eq!(
            ScriptedVariates::new(vec![1.0], vec![-1.0], vec![1]).unwrap_err(),
            VariateError::InvalidDuration { name: "service", value: -1.0 }
        );
        assert_eq!(
            ScriptedVariates::new(vec![1.0], vec![1.0], vec![6]).unwrap_err(),
            VariateError::InvalidSeverity(6)
        );
    }

    #[test]
    fn test_scripted_rejects_all_zero_interarrivals() {
        assert_eq!(
            ScriptedVariates::constant(0.0, 3.0, 2).unwrap_err(),
            VariateError::NoPositiveInterarrival
        );
        assert_eq!(
            ScriptedVariates::new(vec![0.0, 0.0], vec![3.0], vec![2]).unwrap_err(),
            VariateError::NoPositiveInterarrival
        );
        // Zero gaps are fine as long as the cycle moves forward
        assert!(ScriptedVariates::new(vec![0.0, 0.0, 5.0], vec![3.0], vec![2]).is_ok());
    }
}
