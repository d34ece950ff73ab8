//! Simulated time for the ER engine
//!
//! Time is continuous and measured in minutes. The clock only moves forward:
//! events are executed in non-decreasing time order, so an attempt to move
//! the clock backwards means the calendar is broken.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulated time in minutes since the start of the run.
pub type SimTime = f64;

/// Errors raised by the simulation clock
#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("Clock cannot move backwards: now={now}, requested={requested}")]
    Backwards { now: SimTime, requested: SimTime },

    #[error("Clock time must be finite, got {0}")]
    NonFinite(SimTime),
}

/// Current simulated instant plus the configured horizon
///
/// The simulated window is `[0, horizon)`: an event stamped exactly at the
/// horizon is outside the window and is never executed.
///
/// # Example
/// ```
/// use er_simulator_core::SimClock;
///
/// let mut clock = SimClock::new(20.0);
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(5.0).unwrap();
/// assert_eq!(clock.now(), 5.0);
/// assert!(clock.within_horizon(19.9));
/// assert!(!clock.within_horizon(20.0));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    now: SimTime,
    horizon: SimTime,
}

impl SimClock {
    /// Create a clock at time zero with the given horizon (minutes)
    pub fn new(horizon: SimTime) -> Self {
        Self { now: 0.0, horizon }
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Configured end of the simulated window
    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Whether an event stamped at `time` falls inside `[0, horizon)`
    pub fn within_horizon(&self, time: SimTime) -> bool {
        time < self.horizon
    }

    /// Move the clock to `time`
    ///
    /// Staying at the same instant is allowed (many events share a
    /// timestamp); moving backwards is not.
    pub fn advance_to(&mut self, time: SimTime) -> Result<(), ClockError> {
        if !time.is_finite() {
            return Err(ClockError::NonFinite(time));
        }
        if time < self.now {
            return Err(ClockError::Backwards {
                now: self.now,
                requested: time,
            });
        }
        self.now = time;
        Ok(())
    }

    /// Rewind to time zero for a fresh run
    pub fn reset(&mut self) {
        self.now = 0.0;
    }
}
