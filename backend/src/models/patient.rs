//! Patient model
//!
//! A patient is created by an arrival, waits in triage, is served by one
//! doctor, and departs. Each lifecycle timestamp is set exactly once and
//! the ordering `arrival <= service_start <= service_end <= departure`
//! is enforced by the setters.

use crate::core::SimTime;
use crate::models::doctor::DoctorId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity of a patient, unique within one run (1-based, monotonic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatientId(pub u64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Patient#{}", self.0)
    }
}

/// Triage severity: 1 is the most urgent, 5 the least
///
/// The derived ordering follows the numeric level, so "smaller" means
/// "served earlier".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Severity(u8);

impl Severity {
    pub const MOST_URGENT: u8 = 1;
    pub const LEAST_URGENT: u8 = 5;

    /// All levels from most to least urgent
    pub const LEVELS: [u8; 5] = [1, 2, 3, 4, 5];

    /// Validated constructor, `None` outside 1..=5
    pub fn new(level: u8) -> Option<Self> {
        (Self::MOST_URGENT..=Self::LEAST_URGENT)
            .contains(&level)
            .then_some(Self(level))
    }

    /// Constructor that pins out-of-range input to the nearest level
    pub fn clamped(level: u8) -> Self {
        Self(level.clamp(Self::MOST_URGENT, Self::LEAST_URGENT))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

/// Lifecycle violations on a patient record
#[derive(Debug, Error, PartialEq)]
pub enum PatientError {
    #[error("{patient} already started service at {started}")]
    AlreadyInService { patient: PatientId, started: SimTime },

    #[error("{patient} cannot start service at {at} before arriving at {arrival}")]
    ServiceBeforeArrival {
        patient: PatientId,
        at: SimTime,
        arrival: SimTime,
    },

    #[error("{patient} has not started service")]
    NotInService { patient: PatientId },

    #[error("{patient} already finished service at {finished}")]
    AlreadyFinished { patient: PatientId, finished: SimTime },

    #[error("{patient} cannot {what} at {at}, earlier than {earliest}")]
    TimeTravel {
        patient: PatientId,
        what: &'static str,
        at: SimTime,
        earliest: SimTime,
    },

    #[error("{patient} cannot depart before finishing service")]
    DepartBeforeService { patient: PatientId },
}

/// A patient and its lifecycle timestamps
///
/// # Example
/// ```
/// use er_simulator_core::models::{DoctorId, Patient, PatientId, Severity};
///
/// let mut p = Patient::new(PatientId(1), Severity::new(2).unwrap(), 10.0);
/// p.start_service(12.5, DoctorId(1)).unwrap();
/// p.finish_service(20.0).unwrap();
///
/// assert_eq!(p.wait_time(), Some(2.5));
/// assert_eq!(p.service_time(), Some(7.5));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    id: PatientId,
    severity: Severity,
    arrival_time: SimTime,
    service_start: Option<SimTime>,
    service_end: Option<SimTime>,
    departure_time: Option<SimTime>,
    assigned_doctor: Option<DoctorId>,
}

impl Patient {
    pub fn new(id: PatientId, severity: Severity, arrival_time: SimTime) -> Self {
        Self {
            id,
            severity,
            arrival_time,
            service_start: None,
            service_end: None,
            departure_time: None,
            assigned_doctor: None,
        }
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn arrival_time(&self) -> SimTime {
        self.arrival_time
    }

    pub fn service_start(&self) -> Option<SimTime> {
        self.service_start
    }

    pub fn service_end(&self) -> Option<SimTime> {
        self.service_end
    }

    pub fn departure_time(&self) -> Option<SimTime> {
        self.departure_time
    }

    pub fn assigned_doctor(&self) -> Option<DoctorId> {
        self.assigned_doctor
    }

    /// Waiting in triage: arrived but not yet with a doctor
    pub fn is_waiting(&self) -> bool {
        self.service_start.is_none()
    }

    /// With a doctor right now
    pub fn is_in_service(&self) -> bool {
        self.service_start.is_some() && self.service_end.is_none()
    }

    pub fn has_departed(&self) -> bool {
        self.departure_time.is_some()
    }

    /// Time spent in triage, once service has started
    pub fn wait_time(&self) -> Option<f64> {
        self.service_start.map(|start| start - self.arrival_time)
    }

    /// Time spent with the doctor, once service has ended
    pub fn service_time(&self) -> Option<f64> {
        match (self.service_start, self.service_end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Arrival to departure, once departed
    pub fn time_in_system(&self) -> Option<f64> {
        self.departure_time.map(|t| t - self.arrival_time)
    }

    /// Hand the patient to `doctor` at `now`
    pub fn start_service(&mut self, now: SimTime, doctor: DoctorId) -> Result<(), PatientError> {
        if let Some(started) = self.service_start {
            return Err(PatientError::AlreadyInService {
                patient: self.id,
                started,
            });
        }
        if now < self.arrival_time {
            return Err(PatientError::ServiceBeforeArrival {
                patient: self.id,
                at: now,
                arrival: self.arrival_time,
            });
        }
        self.service_start = Some(now);
        self.assigned_doctor = Some(doctor);
        Ok(())
    }

    /// Record the end of service at `now`
    pub fn finish_service(&mut self, now: SimTime) -> Result<(), PatientError> {
        let start = self
            .service_start
            .ok_or(PatientError::NotInService { patient: self.id })?;
        if let Some(finished) = self.service_end {
            return Err(PatientError::AlreadyFinished {
                patient: self.id,
                finished,
            });
        }
        if now < start {
            return Err(PatientError::TimeTravel {
                patient: self.id,
                what: "finish service",
                at: now,
                earliest: start,
            });
        }
        self.service_end = Some(now);
        Ok(())
    }

    /// Record departure at `now`; terminal
    pub fn depart(&mut self, now: SimTime) -> Result<(), PatientError> {
        let end = self
            .service_end
            .ok_or(PatientError::DepartBeforeService { patient: self.id })?;
        if now < end {
            return Err(PatientError::TimeTravel {
                patient: self.id,
                what: "depart",
                at: now,
                earliest: end,
            });
        }
        self.departure_time = Some(now);
        Ok(())
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (sev={})", self.id, self.severity.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient::new(PatientId(7), Severity::new(3).unwrap(), 4.0)
    }

    #[test]
    fn test_severity_bounds() {
        assert!(Severity::new(0).is_none());
        assert!(Severity::new(6).is_none());
        assert_eq!(Severity::new(1).unwrap().level(), 1);
        assert_eq!(Severity::clamped(9).level(), 5);
        assert!(Severity::new(1).unwrap() < Severity::new(5).unwrap());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut p = patient();
        assert!(p.is_waiting());

        p.start_service(6.0, DoctorId(2)).unwrap();
        assert!(p.is_in_service());
        assert_eq!(p.assigned_doctor(), Some(DoctorId(2)));

        p.finish_service(9.0).unwrap();
        p.depart(9.0).unwrap();

        assert_eq!(p.wait_time(), Some(2.0));
        assert_eq!(p.service_time(), Some(3.0));
        assert_eq!(p.time_in_system(), Some(5.0));
        assert!(p.has_departed());
    }

    #[test]
    fn test_service_before_arrival_rejected() {
        let mut p = patient();
        assert_eq!(
            p.start_service(3.0, DoctorId(1)),
            Err(PatientError::ServiceBeforeArrival {
                patient: PatientId(7),
                at: 3.0,
                arrival: 4.0
            })
        );
    }

    #[test]
    fn test_double_start_rejected() {
        let mut p = patient();
        p.start_service(5.0, DoctorId(1)).unwrap();
        assert!(matches!(
            p.start_service(6.0, DoctorId(2)),
            Err(PatientError::AlreadyInService { .. })
        ));
    }

    #[test]
    fn test_finish_requires_start() {
        let mut p = patient();
        assert_eq!(
            p.finish_service(5.0),
            Err(PatientError::NotInService { patient: PatientId(7) })
        );
    }

    #[test]
    fn test_depart_requires_finish() {
        let mut p = patient();
        p.start_service(5.0, DoctorId(1)).unwrap();
        assert_eq!(
            p.depart(8.0),
            Err(PatientError::DepartBeforeService { patient: PatientId(7) })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(patient().to_string(), "Patient#7 (sev=3)");
    }
}
