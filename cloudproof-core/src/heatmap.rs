//! Heatmap construction from raw date-keyed score maps.

use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

use crate::date_key::parse_date_key;
use crate::domain::{ActivityRecord, CalendarDate, HeatmapCell, HeatmapView};
use crate::intensity::classify;
use crate::payload::ActivityPayload;
use crate::score::normalize_score;
use crate::summary::aggregate;
use crate::window::HeatmapWindow;

/// Build the in-window records for a raw heatmap value.
///
/// Keys that fail to parse and dates outside the window are dropped. When
/// two keys name the same day, the later one in the payload wins. Output is
/// in ascending date order with unique dates.
pub fn build_heatmap(raw: Option<&Value>, window: &HeatmapWindow) -> Vec<ActivityRecord> {
    let Some(Value::Object(entries)) = raw else {
        if let Some(other) = raw {
            debug!("ignoring heatmap of unexpected shape: {}", shape_name(other));
        }
        return Vec::new();
    };

    let mut days: BTreeMap<CalendarDate, u64> = BTreeMap::new();
    for (key, value) in entries {
        let Some(date) = parse_date_key(key) else {
            debug!("dropping heatmap entry with malformed key {key:?}");
            continue;
        };
        if !window.contains(date) {
            continue;
        }
        if days.insert(date, normalize_score(value)).is_some() {
            debug!("heatmap key {key:?} replaces an earlier entry for {date}");
        }
    }

    days.into_iter()
        .map(|(date, score)| ActivityRecord::new(date, score))
        .collect()
}

/// Classify records into renderable cells.
pub fn classify_cells(records: &[ActivityRecord]) -> Vec<HeatmapCell> {
    records
        .iter()
        .map(|record| {
            let tier = classify(Some(record));
            HeatmapCell {
                date: record.date,
                score: record.score,
                tier,
                class_name: tier.css_class().to_string(),
                title: record.title(),
            }
        })
        .collect()
}

/// Build the full view for a payload: classified cells plus summary.
pub fn build_view(payload: &ActivityPayload, window: HeatmapWindow) -> HeatmapView {
    let records = build_heatmap(payload.heatmap.as_ref(), &window);
    HeatmapView {
        username: payload.username(),
        window,
        cells: classify_cells(&records),
        summary: aggregate(payload),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
