//! Source of "today" for window construction.

use chrono::Local;

use crate::domain::CalendarDate;
use crate::error::Result;
use crate::window::{HeatmapWindow, WindowSpan};

/// Abstraction over the wall clock for testability.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// The current local calendar day.
    fn today(&self) -> CalendarDate;
}

/// Default clock backed by the system's local time zone.
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub CalendarDate);

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.0
    }
}

/// Resolve a window span against the clock's current day.
pub fn window_for<C: Clock + ?Sized>(clock: &C, span: WindowSpan) -> Result<HeatmapWindow> {
    span.resolve(clock.today())
}
