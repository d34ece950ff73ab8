//! Future events held by the calendar
//!
//! Three kinds drive the whole ER model. The engine dispatches on
//! `EventKind` with a single exhaustive `match`.

use crate::core::SimTime;
use crate::models::patient::PatientId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A new patient walks in
    Arrival,

    /// The patient's doctor finishes treatment
    ServiceEnd { patient: PatientId },

    /// The patient leaves (same instant as service end)
    Departure { patient: PatientId },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Arrival => "Arrival",
            EventKind::ServiceEnd { .. } => "ServiceEnd",
            EventKind::Departure { .. } => "Departure",
        }
    }

    pub fn patient(&self) -> Option<PatientId> {
        match self {
            EventKind::Arrival => None,
            EventKind::ServiceEnd { patient } | EventKind::Departure { patient } => Some(*patient),
        }
    }
}

/// A calendar entry
///
/// Ordered by `(time, seq)`. `seq` is the calendar's insertion counter, so
/// events at the same instant come out in the order they were scheduled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub time: SimTime,
    pub seq: u64,
    pub kind: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}
