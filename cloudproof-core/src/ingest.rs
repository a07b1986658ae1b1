//! CloudTrail ingestion into scored, capped daily activity.
//!
//! Turns raw CloudTrail documents into an [`ActivityReport`] shaped like the
//! activity API response, so the heatmap pipeline can consume it directly.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{Days, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::CalendarDate;
use crate::error::{CloudProofError, Result};
use crate::logs::LogSource;
use crate::payload::ActivityPayload;
use crate::scoring::{DAILY_SCORE_CAP, SERVICE_DAILY_CAP, calculate_score, canonical_service};
use crate::window::{HeatmapWindow, MAX_WINDOW_DAYS};

const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Number of recent actions included in a report.
pub const RECENT_ACTION_LIMIT: usize = 20;

/// A CloudTrail record reduced to what scoring needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudTrailEvent {
    /// UTC calendar day of the event.
    pub date: CalendarDate,
    /// Upper-cased service prefix, e.g. `EC2`.
    pub service: String,
    /// Event name, e.g. `RunInstances`.
    pub action: String,
}

/// An event that earned points and fit under the daily caps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredActivity {
    /// UTC calendar day of the event.
    pub date: CalendarDate,
    /// Service name.
    pub service: String,
    /// Action name.
    pub action: String,
    /// Points awarded.
    pub score: u64,
}

/// Entry in a report's recent action feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecentAction {
    /// ISO calendar day.
    pub date: String,
    /// Service name.
    pub service: String,
    /// Action name.
    pub action: String,
    /// Points awarded.
    pub score: u64,
}

/// Activity summary in the same JSON shape as the activity API response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityReport {
    /// ISO date → capped daily score.
    pub heatmap: BTreeMap<String, u64>,
    /// Service → summed score within the window.
    pub services: BTreeMap<String, u64>,
    /// Most recent actions, newest first.
    pub recent_actions: Vec<RecentAction>,
    /// Sum of the service totals.
    pub total_score: u64,
}

impl ActivityReport {
    /// Re-read the report through the untrusted payload boundary.
    pub fn to_payload(&self) -> Result<ActivityPayload> {
        Ok(ActivityPayload::from_value(serde_json::to_value(self)?))
    }
}

/// Accumulates scored activity while enforcing the daily caps.
#[derive(Debug, Default, Clone)]
pub struct ActivityLedger {
    activities: Vec<ScoredActivity>,
    daily_totals: BTreeMap<CalendarDate, u64>,
    service_totals: HashMap<(CalendarDate, String), u64>,
}

impl ActivityLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Score an event and record it unless it scores zero or a cap is
    /// already reached. Returns whether the event was recorded.
    ///
    /// Caps are checked before adding, so the event that crosses a cap is
    /// still recorded in full.
    pub fn record(&mut self, event: CloudTrailEvent) -> bool {
        let score = calculate_score(&event.service, &event.action);
        if score == 0 {
            return false;
        }

        let day_total = self.daily_totals.get(&event.date).copied().unwrap_or(0);
        if day_total >= DAILY_SCORE_CAP {
            debug!("daily cap reached on {}, skipping {}", event.date, event.action);
            return false;
        }
        let service_key = (event.date, event.service.clone());
        let service_total = self.service_totals.get(&service_key).copied().unwrap_or(0);
        if service_total >= SERVICE_DAILY_CAP {
            debug!(
                "{} cap reached on {}, skipping {}",
                event.service, event.date, event.action
            );
            return false;
        }

        self.daily_totals.insert(event.date, day_total + score);
        self.service_totals.insert(service_key, service_total + score);
        self.activities.push(ScoredActivity {
            date: event.date,
            service: event.service,
            action: event.action,
            score,
        });
        true
    }

    /// Record every event, returning how many were kept.
    pub fn record_all<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = CloudTrailEvent>,
    {
        events
            .into_iter()
            .map(|event| self.record(event))
            .filter(|recorded| *recorded)
            .count()
    }

    /// Recorded activities in ingestion order.
    pub fn activities(&self) -> &[ScoredActivity] {
        &self.activities
    }

    /// Build the report for the `days` before `today`.
    ///
    /// Heatmap and service totals cover [`report_window`]; the recent feed is
    /// not windowed.
    pub fn report(&self, today: NaiveDate, days: u32) -> Result<ActivityReport> {
        let window = report_window(today, days)?;

        let mut daily: BTreeMap<CalendarDate, u64> = BTreeMap::new();
        let mut services: BTreeMap<String, u64> = BTreeMap::new();
        for activity in self
            .activities
            .iter()
            .filter(|a| window.contains(a.date))
        {
            let day = daily.entry(activity.date).or_insert(0);
            *day = (*day + activity.score).min(DAILY_SCORE_CAP);
            *services.entry(activity.service.clone()).or_insert(0) += activity.score;
        }

        let heatmap = daily
            .into_iter()
            .map(|(date, score)| (date.format("%Y-%m-%d").to_string(), score))
            .collect();
        let total_score = services.values().sum();

        Ok(ActivityReport {
            heatmap,
            services,
            recent_actions: self.recent_actions(RECENT_ACTION_LIMIT),
            total_score,
        })
    }

    fn recent_actions(&self, limit: usize) -> Vec<RecentAction> {
        let mut ordered: Vec<(usize, &ScoredActivity)> = self.activities.iter().enumerate().collect();
        ordered.sort_by_key(|(index, activity)| (Reverse(activity.date), Reverse(*index)));
        ordered
            .into_iter()
            .take(limit)
            .map(|(_, activity)| RecentAction {
                date: activity.date.format("%Y-%m-%d").to_string(),
                service: activity.service.clone(),
                action: activity.action.clone(),
                score: activity.score,
            })
            .collect()
    }
}

/// Days a report covers: `today - days` through `today`, so `days + 1`
/// calendar days.
pub fn report_window(today: NaiveDate, days: u32) -> Result<HeatmapWindow> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(CloudProofError::InvalidWindow(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
        )));
    }
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(|| CloudProofError::InvalidWindow(format!("{today} minus {days} days")))?;
    HeatmapWindow::new(start, today)
}

/// Parse a CloudTrail document (`{"Records": [...]}`).
///
/// Text that is not JSON is an error; records that lack a parseable time,
/// source or name are skipped.
pub fn parse_cloudtrail_document(bytes: &[u8]) -> Result<Vec<CloudTrailEvent>> {
    let document: Value = serde_json::from_slice(bytes)?;
    let Some(records) = document.get("Records").and_then(Value::as_array) else {
        debug!("cloudtrail document has no Records array");
        return Ok(Vec::new());
    };
    Ok(records.iter().filter_map(parse_record).collect())
}

fn parse_record(record: &Value) -> Option<CloudTrailEvent> {
    let event_time = record.get("eventTime").and_then(Value::as_str);
    let Some(date) = event_time.and_then(parse_event_date) else {
        debug!("skipping record with unreadable eventTime {event_time:?}");
        return None;
    };
    let service = record
        .get("eventSource")
        .and_then(Value::as_str)
        .map(service_from_event_source)
        .unwrap_or_default();
    let action = record
        .get("eventName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if service.is_empty() || action.is_empty() {
        return None;
    }
    Some(CloudTrailEvent {
        date,
        service,
        action,
    })
}

fn parse_event_date(raw: &str) -> Option<CalendarDate> {
    NaiveDateTime::parse_from_str(raw, EVENT_TIME_FORMAT)
        .ok()
        .map(|time| time.date())
}

/// Map an event source host to a service name: `ec2.amazonaws.com` → `EC2`.
///
/// Services in the rule table keep their table spelling
/// (`cloudformation.amazonaws.com` → `CloudFormation`); others are
/// upper-cased.
pub fn service_from_event_source(source: &str) -> String {
    let prefix = source.split('.').next().unwrap_or_default();
    canonical_service(prefix)
        .map(str::to_string)
        .unwrap_or_else(|| prefix.to_uppercase())
}

/// Read, parse and record every log under `root`.
///
/// Files that cannot be read or parsed are logged and skipped.
pub fn ingest_logs<S: LogSource + ?Sized>(
    source: &S,
    root: &Path,
    ledger: &mut ActivityLedger,
) -> Result<usize> {
    let mut recorded = 0usize;
    for path in source.list_logs(root)? {
        let events = match source
            .read_log(&path)
            .and_then(|bytes| parse_cloudtrail_document(&bytes))
        {
            Ok(events) => events,
            Err(err) => {
                warn!("error processing file {}: {err}", path.display());
                continue;
            }
        };
        recorded += ledger.record_all(events);
    }
    info!("recorded {recorded} scored activities from {}", root.display());
    Ok(recorded)
}
