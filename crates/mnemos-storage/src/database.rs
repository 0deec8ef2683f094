// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! Each `Database` owns one `tokio-rusqlite` connection, so every statement
//! against a given file is serialized on a single background thread. Other
//! processes (the watcher and the worker run separately) may still contend
//! for the write lock; [`crate::writer`] handles that.

use std::path::Path;
use std::time::Duration;

use mnemos_config::model::StorageConfig;
use mnemos_core::MnemosError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Connection-level settings applied on open.
#[derive(Debug, Clone, Copy)]
pub struct OpenOptions {
    /// Switch the journal to WAL mode.
    pub wal_mode: bool,
    /// SQLite `busy_timeout`. Zero makes a locked database fail immediately.
    pub busy_timeout: Duration,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            wal_mode: true,
            busy_timeout: Duration::ZERO,
        }
    }
}

impl From<&StorageConfig> for OpenOptions {
    fn from(config: &StorageConfig) -> Self {
        Self {
            wal_mode: config.wal_mode,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
        }
    }
}

/// An open, migrated SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (creating if needed) the database at `path` with default options.
    pub async fn open(path: &str) -> Result<Self, MnemosError> {
        Self::open_with(path, OpenOptions::default()).await
    }

    /// Open the database at `path`, apply PRAGMAs, and run migrations.
    ///
    /// Missing parent directories are created.
    pub async fn open_with(path: &str, options: OpenOptions) -> Result<Self, MnemosError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(MnemosError::storage)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(MnemosError::storage)?;

        conn.call(
            move |conn| -> Result<Result<(), MnemosError>, rusqlite::Error> {
                conn.busy_timeout(options.busy_timeout)?;
                if options.wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
                }
                Ok(run_migrations(conn))
            },
        )
        .await
        .map_err(map_tr_err)??;

        debug!(path, wal = options.wal_mode, "database opened");
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// The underlying connection. Clones share the same background thread.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Path this database was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Checkpoint the WAL so the main file is self-contained.
    pub async fn close(&self) -> Result<(), MnemosError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(path = %self.path, "WAL checkpoint complete");
        Ok(())
    }
}

/// Convert a tokio-rusqlite error into `MnemosError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> MnemosError {
    MnemosError::storage(e)
}

/// True when SQLite reported `SQLITE_BUSY` or `SQLITE_LOCKED`.
pub fn is_busy_sqlite(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
    )
}

/// True when a storage error was caused by lock contention.
pub fn is_busy(err: &MnemosError) -> bool {
    let MnemosError::Storage { source } = err else {
        return false;
    };
    if let Some(tr) = source.downcast_ref::<tokio_rusqlite::Error<rusqlite::Error>>() {
        return matches!(tr, tokio_rusqlite::Error::Error(inner) if is_busy_sqlite(inner));
    }
    source
        .downcast_ref::<rusqlite::Error>()
        .is_some_and(is_busy_sqlite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_creates_parent_dirs_and_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/events.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table'
                     AND name IN ('events', 'vectors') ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<Result<Vec<String>, _>>()
            })
            .await
            .unwrap();
        assert_eq!(tables, vec!["events", "vectors"]);
    }

    #[tokio::test]
    async fn wal_mode_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wal.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let mode: String = db
            .connection()
            .call(|conn| conn.pragma_query_value(None, "journal_mode", |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twice.db");
        let path = path.to_str().unwrap();
        Database::open(path).await.unwrap().close().await.unwrap();
        Database::open(path).await.unwrap();
    }

    #[tokio::test]
    async fn open_failure_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = match Database::open(dir.path().to_str().unwrap()).await {
            Ok(_) => panic!("opening a directory as a database should fail"),
            Err(e) => e,
        };
        assert!(matches!(err, MnemosError::Storage { .. }), "got {err:?}");
        assert!(!is_busy(&err));
    }

    #[test]
    fn busy_detection() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(is_busy_sqlite(&busy));
        assert!(is_busy(&MnemosError::storage(busy)));

        let locked = tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        ));
        assert!(is_busy(&map_tr_err(locked)));

        let other = rusqlite::Error::QueryReturnedNoRows;
        assert!(!is_busy(&MnemosError::storage(other)));
        assert!(!is_busy(&MnemosError::Internal("x".into())));
    }
}
