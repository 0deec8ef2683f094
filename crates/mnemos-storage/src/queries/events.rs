// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-statement operations on the `events` table.
//!
//! These do not retry; [`crate::queue::EventQueue`] layers the contention
//! policy on top.

use mnemos_core::MnemosError;
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, map_tr_err};
use crate::models::{Event, EventType};

const EVENT_COLUMNS: &str = "id, event_type, path, timestamp, processed";

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    let event_type: Option<String> = row.get(1)?;
    Ok(Event {
        id: row.get(0)?,
        event_type: EventType::from(event_type.unwrap_or_default()),
        path: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        timestamp: row.get::<_, Option<f64>>(3)?.unwrap_or_default(),
        processed: row.get::<_, Option<i64>>(4)?.unwrap_or_default() != 0,
    })
}

/// Insert an unprocessed event. Returns the new row id.
pub async fn insert_event(
    db: &Database,
    event_type: &EventType,
    path: &str,
    timestamp: f64,
) -> Result<i64, MnemosError> {
    let event_type = event_type.as_str().to_string();
    let path = path.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO events (event_type, path, timestamp, processed)
                 VALUES (?1, ?2, ?3, 0)",
                params![event_type, path, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Oldest unprocessed events, ascending by id.
pub async fn fetch_unprocessed(db: &Database, limit: usize) -> Result<Vec<Event>, MnemosError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE processed = 0
                 ORDER BY id ASC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_event)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Set `processed = 1`. Returns whether a row with that id exists.
pub async fn mark_processed(db: &Database, id: i64) -> Result<bool, MnemosError> {
    db.connection()
        .call(move |conn| {
            let changed =
                conn.execute("UPDATE events SET processed = 1 WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a single event by id.
pub async fn get_event(db: &Database, id: i64) -> Result<Option<Event>, MnemosError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                params![id],
                row_to_event,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent events by timestamp, newest first, regardless of state.
pub async fn recent_events(db: &Database, limit: usize) -> Result<Vec<Event>, MnemosError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], row_to_event)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Number of events not yet processed.
pub async fn count_pending(db: &Database) -> Result<u64, MnemosError> {
    count(db, "SELECT COUNT(*) FROM events WHERE processed = 0").await
}

/// Number of events ever recorded.
pub async fn count_total(db: &Database) -> Result<u64, MnemosError> {
    count(db, "SELECT COUNT(*) FROM events").await
}

async fn count(db: &Database, sql: &'static str) -> Result<u64, MnemosError> {
    db.connection()
        .call(move |conn| {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n.max(0) as u64)
        })
        .await
        .map_err(map_tr_err)
}
