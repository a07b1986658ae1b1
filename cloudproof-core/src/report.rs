//! Report formatting utilities for CloudProof outputs.

use std::fmt::Write;

use serde::Serialize;

use crate::domain::{ActivityEvent, HeatmapCell, HeatmapView, IntensityTier, ServiceSummary};
use crate::intensity::tier_floor;

/// Render a heatmap view as Markdown.
pub fn render_view_markdown(view: &HeatmapView) -> String {
    let mut output = String::new();
    let title = view.username.as_deref().unwrap_or("CloudProof");
    let _ = writeln!(output, "# {title} Activity Report\n");
    let _ = writeln!(
        output,
        "- Window: {} to {} ({} days)",
        view.window.start_date(),
        view.window.end_date(),
        view.window.len_days()
    );
    let _ = writeln!(output, "- Total score: {}", view.summary.total_score);
    let _ = writeln!(output, "- Services used: {}", view.summary.service_count);
    let _ = writeln!(output);
    append_tier_table(&mut output, view);
    append_services(&mut output, &view.summary.services);
    append_recent(&mut output, &view.summary.recent_events);
    append_active_days(&mut output, &view.cells);
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Service breakdown sorted by score, highest first; ties by name.
pub fn format_service_breakdown(services: &ServiceSummary) -> Vec<(String, u64)> {
    let mut items: Vec<(String, u64)> = services.iter().map(|(k, v)| (k.clone(), *v)).collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items
}

/// One-line description of a feed entry; missing fields render as `?`.
pub fn format_event(event: &ActivityEvent) -> String {
    let service = event.service.as_deref().unwrap_or("?");
    let action = event.action.as_deref().unwrap_or("?");
    let score = event
        .score
        .map(|score| format!("+{score}"))
        .unwrap_or_else(|| "+?".to_string());
    match event.date.as_deref() {
        Some(date) => format!("{date} {service} {action} {score}"),
        None => format!("{service} {action} {score}"),
    }
}

fn append_tier_table(output: &mut String, view: &HeatmapView) {
    let counts = view.tier_counts();
    let _ = writeln!(output, "### Intensity\n");
    let _ = writeln!(output, "| Tier | From | Class | Color | Days |");
    let _ = writeln!(output, "| --- | --- | --- | --- | --- |");
    for tier in IntensityTier::ALL {
        let _ = writeln!(
            output,
            "| {} | {} | `{}` | {} | {} |",
            tier.label(),
            tier_floor(tier),
            tier.css_class(),
            tier.color(),
            counts.get(&tier).copied().unwrap_or(0)
        );
    }
    let _ = writeln!(output);
}

fn append_services(output: &mut String, services: &ServiceSummary) {
    if services.is_empty() {
        let _ = writeln!(output, "### Service Breakdown\nNo services recorded.\n");
        return;
    }
    let _ = writeln!(output, "### Service Breakdown");
    for (service, score) in format_service_breakdown(services) {
        let _ = writeln!(output, "- {service}: {score}");
    }
    let _ = writeln!(output);
}

fn append_recent(output: &mut String, events: &[ActivityEvent]) {
    if events.is_empty() {
        let _ = writeln!(output, "### Recent Activity\nNo recent activity.\n");
        return;
    }
    let _ = writeln!(output, "### Recent Activity");
    for event in events {
        let _ = writeln!(output, "- {}", format_event(event));
    }
    let _ = writeln!(output);
}

fn append_active_days(output: &mut String, cells: &[HeatmapCell]) {
    let active: Vec<&HeatmapCell> = cells.iter().filter(|cell| cell.score > 0).collect();
    if active.is_empty() {
        let _ = writeln!(
            output,
            "### Active Days\nNo activity data available yet.\n"
        );
        return;
    }
    let _ = writeln!(output, "### Active Days");
    for cell in active {
        let _ = writeln!(output, "- {} ({})", cell.title, cell.tier.label());
    }
    let _ = writeln!(output);
}
