// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text rendering of retrieval results and recent activity for
//! inclusion in an assistant prompt.

use chrono::{DateTime, Local, TimeZone};
use mnemos_storage::Event;

use crate::types::ScoredRecord;

const DOCUMENTS_HEADER: &str = "## Relevant Documents";
const ACTIVITY_HEADER: &str = "## Recent File Activity";

/// `YYYY-MM-DD HH:MM:SS` for epoch seconds in `tz`. Out-of-range input
/// renders as the raw number.
pub fn format_timestamp_in<Tz>(secs: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    match DateTime::from_timestamp(whole as i64, nanos) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}

/// Search hits as `[ts] summary\n(path: P, score: 0.00)` blocks, separated
/// by blank lines.
pub fn format_results_in<Tz>(results: &[ScoredRecord], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    results
        .iter()
        .map(|hit| {
            format!(
                "[{}] {}\n(path: {}, score: {:.2})",
                format_timestamp_in(hit.record.timestamp, tz),
                hit.record.summary,
                hit.record.path,
                hit.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Events as `[ts] TYPE: path` lines.
pub fn format_recent_events_in<Tz>(events: &[Event], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    events
        .iter()
        .map(|e| {
            format!(
                "[{}] {}: {}",
                format_timestamp_in(e.timestamp, tz),
                e.event_type.as_str().to_uppercase(),
                e.path
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Both sections under their headers; empty sections are left out.
pub fn build_context_block_in<Tz>(results: &[ScoredRecord], recent: &[Event], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut sections = Vec::new();
    if !results.is_empty() {
        sections.push(format!("{DOCUMENTS_HEADER}\n{}", format_results_in(results, tz)));
    }
    if !recent.is_empty() {
        sections.push(format!(
            "{ACTIVITY_HEADER}\n{}",
            format_recent_events_in(recent, tz)
        ));
    }
    sections.join("\n\n")
}

/// [`format_results_in`] in the local time zone.
pub fn format_results(results: &[ScoredRecord]) -> String {
    format_results_in(results, &Local)
}

/// [`format_recent_events_in`] in the local time zone.
pub fn format_recent_events(events: &[Event]) -> String {
    format_recent_events_in(events, &Local)
}

/// [`build_context_block_in`] in the local time zone.
pub fn build_context_block(results: &[ScoredRecord], recent: &[Event]) -> String {
    build_context_block_in(results, recent, &Local)
}
