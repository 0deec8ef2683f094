// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed vector store with brute-force cosine search.
//!
//! Embeddings live as little-endian f32 BLOBs in the `vectors` table.
//! Search scans every row; there is no ANN index.

use mnemos_core::MnemosError;
use mnemos_storage::database::map_tr_err;
use mnemos_storage::writer::retry_on_busy;
use mnemos_storage::{Database, RetryPolicy};
use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::types::{MemoryRecord, ScoredRecord, blob_to_vec, cosine_similarity, vec_to_blob};

const RECORD_COLUMNS: &str = "id, path, summary, embedding, timestamp, sha256";

/// Persistent store of memory records, one per document path.
#[derive(Clone)]
pub struct VectorStore {
    conn: Connection,
    policy: RetryPolicy,
}

impl VectorStore {
    /// Wraps a connection whose database already carries the `vectors` table.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            policy: RetryPolicy::default(),
        }
    }

    /// Uses the connection of an opened (and therefore migrated) database.
    pub fn from_database(db: &Database) -> Self {
        Self::new(db.connection().clone())
    }

    /// Replace the retry policy used when a write finds the file locked.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Insert a record, or overwrite every field of the existing record
    /// for `path`. The row id is kept on overwrite.
    ///
    /// A locked database is retried under the store's policy; exhaustion
    /// yields [`MnemosError::StorageBusy`].
    pub async fn upsert(
        &self,
        path: &str,
        summary: &str,
        embedding: &[f32],
        timestamp: f64,
        content_hash: &str,
    ) -> Result<(), MnemosError> {
        let blob = vec_to_blob(embedding);
        let dims = embedding.len();

        retry_on_busy(self.policy, "upsert", || {
            let path = path.to_string();
            let summary = summary.to_string();
            let blob = blob.clone();
            let content_hash = content_hash.to_string();
            async move {
                self.conn
                    .call(move |conn| {
                        conn.execute(
                            "INSERT INTO vectors (path, summary, embedding, timestamp, sha256)
                             VALUES (?1, ?2, ?3, ?4, ?5)
                             ON CONFLICT(path) DO UPDATE SET
                                summary = excluded.summary,
                                embedding = excluded.embedding,
                                timestamp = excluded.timestamp,
                                sha256 = excluded.sha256",
                            params![path, summary, blob, timestamp, content_hash],
                        )?;
                        Ok(())
                    })
                    .await
                    .map_err(map_tr_err)
            }
        })
        .await?;
        debug!(dims, "record upserted");
        Ok(())
    }

    /// The `top_k` records most similar to `query`, best first.
    ///
    /// Ties keep table order. A stored embedding whose length differs from
    /// the query's is reported as [`MnemosError::DimensionMismatch`].
    pub async fn search(
        &self,
        query: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, MnemosError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let records = self.all().await?;
        let mut scored = Vec::with_capacity(records.len());
        for record in records {
            if record.embedding.len() != query.len() {
                return Err(MnemosError::DimensionMismatch {
                    expected: query.len(),
                    actual: record.embedding.len(),
                });
            }
            let score = cosine_similarity(query, &record.embedding);
            scored.push(ScoredRecord { score, record });
        }

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// The record for `path`, if indexed.
    pub async fn get_by_path(&self, path: &str) -> Result<Option<MemoryRecord>, MnemosError> {
        let path = path.to_string();
        self.conn
            .call(move |conn| {
                conn.query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM vectors WHERE path = ?1"),
                    params![path],
                    row_to_record,
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Every record, in id order.
    pub async fn all(&self) -> Result<Vec<MemoryRecord>, MnemosError> {
        self.conn
            .call(move |conn| {
                let mut stmt =
                    conn.prepare(&format!("SELECT {RECORD_COLUMNS} FROM vectors ORDER BY id"))?;
                let records = stmt
                    .query_map([], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(map_tr_err)
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<u64, MnemosError> {
        self.conn
            .call(move |conn| {
                let n: i64 = conn.query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))?;
                Ok(n.max(0) as u64)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert a rusqlite Row to a MemoryRecord. NULL columns read as empty.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let blob: Option<Vec<u8>> = row.get(3)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        path: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        summary: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        embedding: blob.as_deref().map(blob_to_vec).unwrap_or_default(),
        timestamp: row.get::<_, Option<f64>>(4)?.unwrap_or_default(),
        content_hash: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}
