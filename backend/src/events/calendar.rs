//! Future-event calendar
//!
//! A min-heap of `ScheduledEvent`s. Insertion and removal are O(log n).
//! Removal order is non-decreasing in time; equal times are broken by
//! insertion order, which keeps a seeded run reproducible.

use crate::core::SimTime;
use crate::events::types::{EventKind, ScheduledEvent};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalendarError {
    #[error("Cannot schedule {kind} at non-finite time {time}")]
    NonFiniteTime { kind: &'static str, time: SimTime },

    #[error("Cannot schedule {kind} at negative time {time}")]
    NegativeTime { kind: &'static str, time: SimTime },
}

/// # Example
/// ```
/// use er_simulator_core::events::{EventCalendar, EventKind};
///
/// let mut calendar = EventCalendar::new();
/// calendar.schedule(5.0, EventKind::Arrival).unwrap();
/// calendar.schedule(1.0, EventKind::Arrival).unwrap();
///
/// assert_eq!(calendar.pop_earliest().map(|e| e.time), Some(1.0));
/// assert_eq!(calendar.pop_earliest().map(|e| e.time), Some(5.0));
/// assert!(calendar.pop_earliest().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventCalendar {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event; returns its insertion sequence number
    pub fn schedule(&mut self, time: SimTime, kind: EventKind) -> Result<u64, CalendarError> {
        if !time.is_finite() {
            return Err(CalendarError::NonFiniteTime {
                kind: kind.name(),
                time,
            });
        }
        if time < 0.0 {
            return Err(CalendarError::NegativeTime {
                kind: kind.name(),
                time,
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(ScheduledEvent { time, seq, kind }));
        Ok(seq)
    }

    /// Remove and return the earliest event
    pub fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.heap.peek().map(|Reverse(event)| event)
    }

    /// Time of the earliest pending event
    pub fn peek_time(&self) -> Option<SimTime> {
        self.peek().map(|e| e.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop all pending events and restart the insertion counter
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}
