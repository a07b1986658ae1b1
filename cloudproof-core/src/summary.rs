//! Summary aggregation for the profile header, breakdown and feed views.

use serde_json::{Map, Value};

use crate::domain::{ActivityEvent, ActivitySummary, ServiceSummary};
use crate::payload::ActivityPayload;
use crate::score::normalize_score;

/// Maximum number of recent events shown.
pub const RECENT_EVENT_LIMIT: usize = 10;

/// Aggregate totals, service breakdown and recent feed from a payload.
pub fn aggregate(payload: &ActivityPayload) -> ActivitySummary {
    let services = service_summary(payload.services.as_ref());
    ActivitySummary {
        total_score: total_score(payload.total_score.as_ref()),
        service_count: services.len(),
        services,
        recent_events: recent_events(payload.recent_actions.as_ref(), RECENT_EVENT_LIMIT),
    }
}

fn total_score(raw: Option<&Value>) -> i64 {
    let Some(Value::Number(number)) = raw else {
        return 0;
    };
    if let Some(value) = number.as_i64() {
        return value;
    }
    match number.as_f64() {
        // Truncates toward zero and saturates at the i64 bounds.
        Some(value) if value.is_finite() => value as i64,
        _ => 0,
    }
}

fn service_summary(raw: Option<&Value>) -> ServiceSummary {
    let Some(Value::Object(entries)) = raw else {
        return ServiceSummary::new();
    };
    entries
        .iter()
        .map(|(service, score)| (service.clone(), normalize_score(score)))
        .collect()
}

fn recent_events(raw: Option<&Value>, limit: usize) -> Vec<ActivityEvent> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };
    entries.iter().take(limit).map(event_from_value).collect()
}

fn event_from_value(value: &Value) -> ActivityEvent {
    let Value::Object(fields) = value else {
        return ActivityEvent::default();
    };
    ActivityEvent {
        date: string_field(fields, "date"),
        service: string_field(fields, "service"),
        action: string_field(fields, "action"),
        score: fields.get("score").and_then(Value::as_i64),
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}
