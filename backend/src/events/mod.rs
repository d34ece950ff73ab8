//! Future-event calendar and the events it holds

pub mod calendar;
pub mod types;

pub use calendar::{CalendarError, EventCalendar};
pub use types::{EventKind, ScheduledEvent};
