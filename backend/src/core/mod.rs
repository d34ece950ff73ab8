//! Core primitives shared by every simulation component

pub mod time;

pub use time::{ClockError, SimClock, SimTime};
