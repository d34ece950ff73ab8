//! Doctor pool
//!
//! Owns every `Doctor` in a run. Patients only ever hold a `DoctorId`.
//!
//! `first_idle` scans in ascending id order, so when several doctors are
//! free at the same instant the lowest id always wins. Pools are small
//! (single-digit doctor counts), so a linear scan is used.

use crate::core::SimTime;
use crate::models::doctor::{Doctor, DoctorError, DoctorId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("Unknown doctor {0}")]
    UnknownDoctor(DoctorId),

    #[error(transparent)]
    Doctor(#[from] DoctorError),
}

#[derive(Debug, Clone)]
pub struct DoctorPool {
    doctors: Vec<Doctor>,
}

impl DoctorPool {
    /// Create `count` idle doctors with ids `D1..=Dcount`
    pub fn new(count: u32) -> Self {
        Self {
            doctors: (1..=count).map(|n| Doctor::new(DoctorId(n))).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }

    pub fn get(&self, id: DoctorId) -> Option<&Doctor> {
        self.index_of(id).map(|i| &self.doctors[i])
    }

    /// Doctors in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Doctor> {
        self.doctors.iter()
    }

    /// Lowest-id idle doctor, if any
    pub fn first_idle(&self) -> Option<DoctorId> {
        self.doctors.iter().find(|d| !d.is_busy()).map(|d| d.id())
    }

    pub fn idle_count(&self) -> usize {
        self.doctors.iter().filter(|d| !d.is_busy()).count()
    }

    pub fn busy_count(&self) -> usize {
        self.doctors.len() - self.idle_count()
    }

    /// Idle → busy; a doctor that is already busy is an invariant violation
    pub fn mark_busy(&mut self, id: DoctorId, now: SimTime) -> Result<(), PoolError> {
        let doctor = self.doctor_mut(id)?;
        doctor.mark_busy(now)?;
        Ok(())
    }

    /// Busy → idle, adding the elapsed interval; no-op if already idle
    pub fn mark_idle(&mut self, id: DoctorId, now: SimTime) -> Result<(), PoolError> {
        let doctor = self.doctor_mut(id)?;
        doctor.mark_idle(now)?;
        Ok(())
    }

    /// Close every open busy interval at `now`
    ///
    /// Called once at the end of a run so that a doctor still with a patient
    /// at the horizon is credited up to the horizon.
    pub fn flush_at_horizon(&mut self, now: SimTime) -> Result<(), PoolError> {
        for doctor in self.doctors.iter_mut().filter(|d| d.is_busy()) {
            doctor.mark_idle(now)?;
        }
        Ok(())
    }

    /// Busy minutes summed over all doctors (closed intervals only)
    pub fn total_busy_minutes(&self) -> f64 {
        self.doctors.iter().map(|d| d.busy_minutes()).sum()
    }

    /// Return every doctor to idle with zeroed totals
    pub fn reset(&mut self) {
        for doctor in &mut self.doctors {
            doctor.reset();
        }
    }

    fn index_of(&self, id: DoctorId) -> Option<usize> {
        // Ids are dense and 1-based.
        let idx = (id.0 as usize).checked_sub(1)?;
        (idx < self.doctors.len()).then_some(idx)
    }

    fn doctor_mut(&mut self, id: DoctorId) -> Result<&mut Doctor, PoolError> {
        let idx = self.index_of(id).ok_or(PoolError::UnknownDoctor(id))?;
        Ok(&mut self.doctors[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_idle_prefers_lowest_id() {
        let mut pool = DoctorPool::new(3);
        assert_eq!(pool.first_idle(), Some(DoctorId(1)));

        pool.mark_busy(DoctorId(1), 0.0).unwrap();
        assert_eq!(pool.first_idle(), Some(DoctorId(2)));

        pool.mark_busy(DoctorId(2), 0.0).unwrap();
        pool.mark_busy(DoctorId(3), 0.0).unwrap();
        assert_eq!(pool.first_idle(), None);

        pool.mark_idle(DoctorId(2), 1.0).unwrap();
        assert_eq!(pool.first_idle(), Some(DoctorId(2)));
    }

    #[test]
    fn test_unknown_doctor() {
        let mut pool = DoctorPool::new(2);
        assert_eq!(
            pool.mark_busy(DoctorId(0), 0.0),
            Err(PoolError::UnknownDoctor(DoctorId(0)))
        );
        assert_eq!(
            pool.mark_idle(DoctorId(3), 0.0),
            Err(PoolError::UnknownDoctor(DoctorId(3)))
        );
        assert!(pool.get(DoctorId(3)).is_none());
    }

    #[test]
    fn test_reset_clears_history() {
        let mut pool = DoctorPool::new(1);
        pool.mark_busy(DoctorId(1), 0.0).unwrap();
        pool.mark_idle(DoctorId(1), 3.0).unwrap();
        pool.mark_busy(DoctorId(1), 4.0).unwrap();

        pool.reset();

        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.total_busy_minutes(), 0.0);
    }
}
