//! Domain entities for CloudProof heatmaps.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::window::HeatmapWindow;

/// A calendar day with no time-of-day or offset attached.
pub type CalendarDate = NaiveDate;

/// Cumulative score per originating service.
pub type ServiceSummary = BTreeMap<String, u64>;

/// One day of activity inside a built heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct ActivityRecord {
    /// Calendar day the score belongs to.
    #[schema(value_type = String, format = Date)]
    pub date: CalendarDate,
    /// Non-negative score for the day.
    pub score: u64,
}

impl ActivityRecord {
    /// Create a record for a day.
    pub fn new(date: CalendarDate, score: u64) -> Self {
        Self { date, score }
    }

    /// Hover title shown for the cell, e.g. `2025-02-20: 14`.
    pub fn title(&self) -> String {
        format!("{}: {}", self.date.format("%Y-%m-%d"), self.score)
    }
}

/// Discrete visual bucket assigned to a heatmap cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum IntensityTier {
    /// No activity.
    Empty,
    /// Scores 1 through 4.
    Low,
    /// Scores 5 through 9.
    Medium,
    /// Scores 10 through 19.
    High,
    /// Scores of 20 and above.
    VeryHigh,
}

impl IntensityTier {
    /// All tiers from least to most intense.
    pub const ALL: [IntensityTier; 5] = [
        IntensityTier::Empty,
        IntensityTier::Low,
        IntensityTier::Medium,
        IntensityTier::High,
        IntensityTier::VeryHigh,
    ];

    /// Style selector consumed by the rendering layer.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Empty => "color-empty",
            Self::Low => "color-scale-1",
            Self::Medium => "color-scale-2",
            Self::High => "color-scale-3",
            Self::VeryHigh => "color-scale-4",
        }
    }

    /// Legend color for the tier.
    pub fn color(self) -> &'static str {
        match self {
            Self::Empty => "#161b22",
            Self::Low => "#0e4429",
            Self::Medium => "#006d32",
            Self::High => "#26a641",
            Self::VeryHigh => "#39d353",
        }
    }

    /// Short label used in text reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very high",
        }
    }
}

/// A classified heatmap cell ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    /// Calendar day of the cell.
    #[schema(value_type = String, format = Date)]
    pub date: CalendarDate,
    /// Normalized score.
    pub score: u64,
    /// Intensity bucket for the score.
    pub tier: IntensityTier,
    /// Style selector for the tier.
    pub class_name: String,
    /// Hover title for the cell.
    pub title: String,
}

/// One entry in the recent activity feed.
///
/// Every field is optional: the feed is passed through from an untrusted
/// payload and only checked for presence at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEvent {
    /// Day the action happened, as sent by the producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Originating service, e.g. `EC2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Action name, e.g. `RunInstances`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Score awarded for the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

/// Aggregated totals for the profile header and breakdown views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Total score reported by the producer.
    pub total_score: i64,
    /// Number of distinct services.
    pub service_count: usize,
    /// Per-service score breakdown.
    pub services: ServiceSummary,
    /// Bounded, most-recent-first activity feed.
    pub recent_events: Vec<ActivityEvent>,
}

/// Everything the rendering layer needs for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapView {
    /// Username, when the payload carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Window the cells were built for.
    pub window: HeatmapWindow,
    /// Classified cells in ascending date order.
    pub cells: Vec<HeatmapCell>,
    /// Summary totals.
    pub summary: ActivitySummary,
}

impl HeatmapView {
    /// Count of cells per tier, in tier order.
    pub fn tier_counts(&self) -> BTreeMap<IntensityTier, usize> {
        let mut counts: BTreeMap<IntensityTier, usize> =
            IntensityTier::ALL.iter().map(|tier| (*tier, 0)).collect();
        for cell in &self.cells {
            *counts.entry(cell.tier).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of cell scores inside the window.
    pub fn window_score(&self) -> u64 {
        self.cells
            .iter()
            .fold(0u64, |total, cell| total.saturating_add(cell.score))
    }
}
