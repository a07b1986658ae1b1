#![deny(missing_docs)]
//! CloudProof core library.
//!
//! This crate turns untrusted activity payloads into classified heatmap
//! cells and summaries, and scores local CloudTrail logs into the same
//! payload shape.

pub mod clock;
pub mod date_key;
pub mod domain;
pub mod error;
pub mod heatmap;
pub mod ingest;
pub mod intensity;
pub mod logs;
pub mod payload;
pub mod report;
pub mod score;
/// Scoring rule table and daily caps.
pub mod scoring;
pub mod summary;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock, window_for};
pub use date_key::parse_date_key;
pub use domain::{
    ActivityEvent, ActivityRecord, ActivitySummary, CalendarDate, HeatmapCell, HeatmapView,
    IntensityTier, ServiceSummary,
};
pub use error::{CloudProofError, Result};
pub use heatmap::{build_heatmap, build_view, classify_cells};
pub use ingest::{
    ActivityLedger, ActivityReport, CloudTrailEvent, RecentAction, ingest_logs,
    parse_cloudtrail_document, report_window,
};
pub use intensity::{classify, tier_floor, tier_for_score};
pub use logs::{
    LogSource, MAX_DECODED_LOG_BYTES, StdLogSource, decode_log_bytes, decode_log_bytes_limited,
};
pub use payload::ActivityPayload;
pub use report::{format_event, format_service_breakdown, render_json, render_view_markdown};
pub use score::normalize_score;
pub use scoring::{ScoringRule, ScoringRules, calculate_score, scoring_rules};
pub use summary::{RECENT_EVENT_LIMIT, aggregate};
pub use window::{
    DEFAULT_ACTIVITY_DAYS, DEFAULT_PROFILE_DAYS, HeatmapWindow, MAX_WINDOW_DAYS, WindowSpan,
};
