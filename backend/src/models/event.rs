//! Event log for replay checks and auditing.
//!
//! Every executed state change is appended here in execution order. The log
//! is what determinism tests compare between runs, and what lifecycle tests
//! inspect to check ordering and fairness.
//!
//! Not to be confused with the future-event calendar (`crate::events`),
//! which holds events that have not happened yet.
//!
//! # Example
//!
//! ```rust
//! use er_simulator_core::models::{Event, EventLog, PatientId};
//!
//! let mut log = EventLog::new();
//! log.log(Event::Arrival {
//!     time: 0.0,
//!     patient: PatientId(1),
//!     severity: 2,
//! });
//!
//! assert_eq!(log.events_of_type("Arrival").len(), 1);
//! ```

use crate::core::SimTime;
use crate::models::doctor::DoctorId;
use crate::models::patient::PatientId;
use serde::{Deserialize, Serialize};

/// Executed state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Patient entered triage
    Arrival {
        time: SimTime,
        patient: PatientId,
        severity: u8,
    },

    /// Patient left triage and went to a doctor
    ServiceStart {
        time: SimTime,
        patient: PatientId,
        severity: u8,
        doctor: DoctorId,
        wait: f64,
    },

    /// Doctor finished with the patient and became idle
    ServiceEnd {
        time: SimTime,
        patient: PatientId,
        doctor: DoctorId,
        service_time: f64,
    },

    /// Patient left the ER
    Departure {
        time: SimTime,
        patient: PatientId,
        time_in_system: f64,
    },
}

impl Event {
    /// Simulated time at which the change happened
    pub fn time(&self) -> SimTime {
        match self {
            Event::Arrival { time, .. } => *time,
            Event::ServiceStart { time, .. } => *time,
            Event::ServiceEnd { time, .. } => *time,
            Event::Departure { time, .. } => *time,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "Arrival",
            Event::ServiceStart { .. } => "ServiceStart",
            Event::ServiceEnd { .. } => "ServiceEnd",
            Event::Departure { .. } => "Departure",
        }
    }

    pub fn patient_id(&self) -> PatientId {
        match self {
            Event::Arrival { patient, .. } => *patient,
            Event::ServiceStart { patient, .. } => *patient,
            Event::ServiceEnd { patient, .. } => *patient,
            Event::Departure { patient, .. } => *patient,
        }
    }

    /// Doctor involved, if any
    pub fn doctor_id(&self) -> Option<DoctorId> {
        match self {
            Event::ServiceStart { doctor, .. } => Some(*doctor),
            Event::ServiceEnd { doctor, .. } => Some(*doctor),
            _ => None,
        }
    }
}

/// Append-only sequence of executed events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_patient(&self, patient: PatientId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.patient_id() == patient)
            .collect()
    }

    pub fn events_for_doctor(&self, doctor: DoctorId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.doctor_id() == Some(doctor))
            .collect()
    }

    /// Events with `start <= time < end`
    pub fn events_between(&self, start: SimTime, end: SimTime) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.time() >= start && e.time() < end)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> EventLog {
        let mut log = EventLog::new();
        log.log(Event::Arrival {
            time: 0.0,
            patient: PatientId(1),
            severity: 3,
        });
        log.log(Event::ServiceStart {
            time: 0.0,
            patient: PatientId(1),
            severity: 3,
            doctor: DoctorId(1),
            wait: 0.0,
        });
        log.log(Event::Arrival {
            time: 2.0,
            patient: PatientId(2),
            severity: 1,
        });
        log.log(Event::ServiceEnd {
            time: 4.0,
            patient: PatientId(1),
            doctor: DoctorId(1),
            service_time: 4.0,
        });
        log.log(Event::Departure {
            time: 4.0,
            patient: PatientId(1),
            time_in_system: 4.0,
        });
        log
    }

    #[test]
    fn test_query_by_type() {
        let log = sample_log();
        assert_eq!(log.events_of_type("Arrival").len(), 2);
        assert_eq!(log.events_of_type("Departure").len(), 1);
    }

    #[test]
    fn test_query_by_patient() {
        let log = sample_log();
        assert_eq!(log.events_for_patient(PatientId(1)).len(), 4);
        assert_eq!(log.events_for_patient(PatientId(2)).len(), 1);
    }

    #[test]
    fn test_query_by_doctor() {
        let log = sample_log();
        assert_eq!(log.events_for_doctor(DoctorId(1)).len(), 2);
        assert!(log.events_for_doctor(DoctorId(2)).is_empty());
    }

    #[test]
    fn test_query_by_window() {
        let log = sample_log();
        assert_eq!(log.events_between(0.0, 2.0).len(), 2);
        assert_eq!(log.events_between(2.0, 5.0).len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut log = sample_log();
        log.clear();
        assert!(log.is_empty());
    }
}
