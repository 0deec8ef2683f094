// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the event queue.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of filesystem change recorded in the queue.
///
/// Stored as a lowercase name. Names this enum does not know are kept
/// verbatim in [`EventType::Other`] so they round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Created,
    Modified,
    Deleted,
    Moved,
    Other(String),
}

impl EventType {
    /// The name written to the `event_type` column.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Created => "created",
            EventType::Modified => "modified",
            EventType::Deleted => "deleted",
            EventType::Moved => "moved",
            EventType::Other(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "created" => EventType::Created,
            "modified" => EventType::Modified,
            "deleted" => EventType::Deleted,
            "moved" => EventType::Moved,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        EventType::from(name.as_str())
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A row of the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic rowid; FIFO order follows it.
    pub id: i64,
    pub event_type: EventType,
    pub path: String,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub processed: bool,
}
