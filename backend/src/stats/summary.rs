//! Flat key/value run summary
//!
//! Keys are stable and sorted (`BTreeMap`) so exporters and run-to-run
//! comparisons need no schema negotiation. Values are pre-formatted:
//! integers plain, decimals with four fractional digits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TOTAL_ARRIVALS: &str = "total_arrivals";
pub const TOTAL_SERVICE_STARTS: &str = "total_service_starts";
pub const TOTAL_DEPARTURES: &str = "total_departures";
pub const AVG_WAIT: &str = "avg_wait";
pub const MAX_WAIT: &str = "max_wait";
pub const AVG_SERVICE: &str = "avg_service";
pub const AVG_TIME_IN_SYSTEM: &str = "avg_time_in_system";
pub const AVG_QUEUE_LENGTH: &str = "avg_queue_length";
pub const MAX_QUEUE_LENGTH: &str = "max_queue_length";
pub const WAITING_AT_HORIZON: &str = "patients_waiting_at_horizon";
pub const IN_SERVICE_AT_HORIZON: &str = "patients_in_service_at_horizon";
pub const SIM_MINUTES: &str = "sim_minutes";

pub fn doctor_busy_key(doctor: u32) -> String {
    format!("doctor_{}_busy_minutes", doctor)
}

pub fn doctor_utilization_key(doctor: u32) -> String {
    format!("doctor_{}_utilization", doctor)
}

pub fn doctor_served_key(doctor: u32) -> String {
    format!("doctor_{}_patients_served", doctor)
}

pub fn severity_arrivals_key(level: u8) -> String {
    format!("severity_{}_arrivals", level)
}

pub fn severity_avg_wait_key(level: u8) -> String {
    format!("severity_{}_avg_wait", level)
}

pub fn format_decimal(value: f64) -> String {
    // Avoid "-0.0000" for values that round to zero.
    let rounded = format!("{:.4}", value);
    if rounded == "-0.0000" {
        "0.0000".to_string()
    } else {
        rounded
    }
}

/// Immutable statistic name → formatted value mapping
///
/// # Example
/// ```
/// use er_simulator_core::stats::SimulationSummary;
///
/// let summary = SimulationSummary::builder()
///     .count("total_arrivals", 4)
///     .decimal("avg_wait", 0.0)
///     .build();
///
/// assert_eq!(summary.get("total_arrivals"), Some("4"));
/// assert_eq!(summary.get("avg_wait"), Some("0.0000"));
/// assert_eq!(summary.get_f64("avg_wait"), Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationSummary {
    entries: BTreeMap<String, String>,
}

impl SimulationSummary {
    pub fn builder() -> SummaryBuilder {
        SummaryBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.parse().ok()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.parse().ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl FromIterator<(String, String)> for SimulationSummary {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SummaryBuilder {
    entries: BTreeMap<String, String>,
}

impl SummaryBuilder {
    pub fn count(mut self, key: impl Into<String>, value: u64) -> Self {
        self.entries.insert(key.into(), value.to_string());
        self
    }

    pub fn decimal(mut self, key: impl Into<String>, value: f64) -> Self {
        self.entries.insert(key.into(), format_decimal(value));
        self
    }

    pub fn build(self) -> SimulationSummary {
        SimulationSummary {
            entries: self.entries,
        }
    }
}
