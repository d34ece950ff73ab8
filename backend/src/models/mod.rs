//! Domain models for the ER simulator

pub mod doctor;
pub mod event;
pub mod patient;

// Re-exports
pub use doctor::{Doctor, DoctorError, DoctorId};
pub use event::{Event, EventLog};
pub use patient::{Patient, PatientError, PatientId, Severity};
