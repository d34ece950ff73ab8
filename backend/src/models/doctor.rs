//! Doctor model
//!
//! A doctor serves at most one patient at a time. Busy minutes are
//! accumulated per closed busy interval: `mark_busy` opens an interval,
//! `mark_idle` closes it and adds its length to the running total.

use crate::core::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of a doctor (1-based, displayed as `D<n>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoctorId(pub u32);

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Busy/idle transition errors
#[derive(Debug, Error, PartialEq)]
pub enum DoctorError {
    #[error("Doctor {doctor} is already busy since {since}")]
    AlreadyBusy { doctor: DoctorId, since: SimTime },

    #[error("Doctor {doctor} cannot go idle at {at}, busy interval started at {since}")]
    NegativeInterval {
        doctor: DoctorId,
        since: SimTime,
        at: SimTime,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    id: DoctorId,
    /// Start of the open busy interval, `None` while idle
    busy_since: Option<SimTime>,
    busy_minutes: f64,
    patients_served: u64,
}

impl Doctor {
    pub fn new(id: DoctorId) -> Self {
        Self {
            id,
            busy_since: None,
            busy_minutes: 0.0,
            patients_served: 0,
        }
    }

    pub fn id(&self) -> DoctorId {
        self.id
    }

    pub fn is_busy(&self) -> bool {
        self.busy_since.is_some()
    }

    pub fn busy_since(&self) -> Option<SimTime> {
        self.busy_since
    }

    /// Busy minutes over closed intervals only
    pub fn busy_minutes(&self) -> f64 {
        self.busy_minutes
    }

    /// Number of patients this doctor has started serving
    pub fn patients_served(&self) -> u64 {
        self.patients_served
    }

    /// Idle → busy at `now`
    pub fn mark_busy(&mut self, now: SimTime) -> Result<(), DoctorError> {
        if let Some(since) = self.busy_since {
            return Err(DoctorError::AlreadyBusy {
                doctor: self.id,
                since,
            });
        }
        self.busy_since = Some(now);
        self.patients_served += 1;
        Ok(())
    }

    /// Busy → idle at `now`, closing the interval. No-op while idle.
    pub fn mark_idle(&mut self, now: SimTime) -> Result<(), DoctorError> {
        let Some(since) = self.busy_since else {
            return Ok(());
        };
        if now < since {
            return Err(DoctorError::NegativeInterval {
                doctor: self.id,
                since,
                at: now,
            });
        }
        self.busy_minutes += now - since;
        self.busy_since = None;
        Ok(())
    }

    /// Back to a fresh, idle doctor with no history
    pub fn reset(&mut self) {
        self.busy_since = None;
        self.busy_minutes = 0.0;
        self.patients_served = 0;
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_busy() { "busy" } else { "idle" };
        write!(f, "{}({})", self.id, state)
    }
}
