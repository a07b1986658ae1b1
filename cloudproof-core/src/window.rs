//! Heatmap window construction.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CalendarDate;
use crate::error::{CloudProofError, Result};

/// Largest trailing span the activity API accepts.
pub const MAX_WINDOW_DAYS: u32 = 730;
/// Trailing span used by the activity dashboard.
pub const DEFAULT_ACTIVITY_DAYS: u32 = 365;
/// Trailing span used by public profiles.
pub const DEFAULT_PROFILE_DAYS: u32 = 730;

/// Inclusive date range a heatmap is rendered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "WindowBounds")]
pub struct HeatmapWindow {
    /// First day in the window.
    #[schema(value_type = String, format = Date)]
    start_date: CalendarDate,
    /// Last day in the window.
    #[schema(value_type = String, format = Date)]
    end_date: CalendarDate,
}

impl HeatmapWindow {
    /// Build a window from explicit bounds.
    pub fn new(start_date: CalendarDate, end_date: CalendarDate) -> Result<Self> {
        if start_date > end_date {
            return Err(CloudProofError::InvalidWindow(format!(
                "start {start_date} is after end {end_date}"
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// The `days` calendar days ending on `today`, both ends inclusive.
    pub fn trailing_days(today: CalendarDate, days: u32) -> Result<Self> {
        if days == 0 || days > MAX_WINDOW_DAYS {
            return Err(CloudProofError::InvalidWindow(format!(
                "days must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
            )));
        }
        let start_date = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| CloudProofError::InvalidWindow(format!("{today} minus {days} days")))?;
        Self::new(start_date, today)
    }

    /// One calendar year back from `today`.
    ///
    /// February 29th maps to February 28th of the previous year.
    pub fn year_back(today: CalendarDate) -> Result<Self> {
        let start_date = today
            .checked_sub_months(Months::new(12))
            .ok_or_else(|| CloudProofError::InvalidWindow(format!("{today} minus one year")))?;
        Self::new(start_date, today)
    }

    /// First day in the window.
    pub fn start_date(&self) -> CalendarDate {
        self.start_date
    }

    /// Last day in the window.
    pub fn end_date(&self) -> CalendarDate {
        self.end_date
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Number of days covered, counting both ends.
    pub fn len_days(&self) -> u64 {
        (self.end_date - self.start_date).num_days() as u64 + 1
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowBounds {
    start_date: CalendarDate,
    end_date: CalendarDate,
}

impl TryFrom<WindowBounds> for HeatmapWindow {
    type Error = CloudProofError;

    fn try_from(value: WindowBounds) -> Result<Self> {
        Self::new(value.start_date, value.end_date)
    }
}

/// How a caller asks for a window relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpan {
    /// A trailing number of days.
    TrailingDays(u32),
    /// One calendar year back.
    YearBack,
}

impl WindowSpan {
    /// Resolve the span against a concrete day.
    pub fn resolve(self, today: NaiveDate) -> Result<HeatmapWindow> {
        match self {
            Self::TrailingDays(days) => HeatmapWindow::trailing_days(today, days),
            Self::YearBack => HeatmapWindow::year_back(today),
        }
    }
}
