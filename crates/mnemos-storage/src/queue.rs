// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable FIFO event queue shared by the watcher (producer) and the
//! indexing worker (consumer).
//!
//! Producers are best-effort: a change that cannot be written after the
//! configured retries is logged and dropped. Consumers see events in id
//! order, and each event is marked processed exactly once.

use std::time::{SystemTime, UNIX_EPOCH};

use mnemos_config::model::QueueConfig;
use mnemos_core::MnemosError;
use tracing::{debug, warn};

use crate::database::Database;
use crate::models::{Event, EventType};
use crate::queries::events;
use crate::writer::{RetryPolicy, retry_on_busy};

/// Handle to the `events` table of one database.
#[derive(Clone)]
pub struct EventQueue {
    db: Database,
    policy: RetryPolicy,
}

impl EventQueue {
    /// Wrap an open database with the given write retry policy.
    pub fn new(db: Database, policy: RetryPolicy) -> Self {
        Self { db, policy }
    }

    /// Wrap an open database using the `[queue]` config section.
    pub fn from_config(db: Database, config: &QueueConfig) -> Self {
        Self::new(db, RetryPolicy::from(config))
    }

    /// The database this queue writes to.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Append an event.
    ///
    /// Returns `Ok(Some(id))` on success and `Ok(None)` when the database
    /// stayed locked through every retry. Any other failure is an error.
    pub async fn enqueue(
        &self,
        event_type: EventType,
        path: &str,
        timestamp: f64,
    ) -> Result<Option<i64>, MnemosError> {
        let result = retry_on_busy(self.policy, "enqueue", || {
            events::insert_event(&self.db, &event_type, path, timestamp)
        })
        .await;

        match result {
            Ok(id) => {
                debug!(id, event_type = %event_type, path, "event enqueued");
                Ok(Some(id))
            }
            Err(MnemosError::StorageBusy { attempts }) => {
                warn!(
                    event_type = %event_type,
                    path,
                    attempts,
                    "event queue busy, change dropped"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Append an event stamped with the current wall-clock time.
    pub async fn enqueue_now(
        &self,
        event_type: EventType,
        path: &str,
    ) -> Result<Option<i64>, MnemosError> {
        self.enqueue(event_type, path, now_epoch_secs()).await
    }

    /// Up to `limit` unprocessed events, oldest id first. Does not claim them.
    pub async fn fetch_unprocessed(&self, limit: usize) -> Result<Vec<Event>, MnemosError> {
        events::fetch_unprocessed(&self.db, limit).await
    }

    /// Mark an event processed. Idempotent; unknown ids are ignored.
    ///
    /// Retries on contention like [`enqueue`](Self::enqueue), but an
    /// exhausted retry is an error: losing the mark would replay the event.
    pub async fn mark_processed(&self, id: i64) -> Result<(), MnemosError> {
        let found = retry_on_busy(self.policy, "mark_processed", || {
            events::mark_processed(&self.db, id)
        })
        .await?;
        if !found {
            debug!(id, "mark_processed on unknown event id");
        }
        Ok(())
    }

    /// Newest events by timestamp, processed or not.
    pub async fn recent(&self, limit: usize) -> Result<Vec<Event>, MnemosError> {
        events::recent_events(&self.db, limit).await
    }

    /// One event by id.
    pub async fn get(&self, id: i64) -> Result<Option<Event>, MnemosError> {
        events::get_event(&self.db, id).await
    }

    /// Events still waiting for the worker.
    pub async fn pending_count(&self) -> Result<u64, MnemosError> {
        events::count_pending(&self.db).await
    }

    /// Events ever recorded.
    pub async fn total_count(&self) -> Result<u64, MnemosError> {
        events::count_total(&self.db).await
    }
}

/// Seconds since the Unix epoch as a float.
pub fn now_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
