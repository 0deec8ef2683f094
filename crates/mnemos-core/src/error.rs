// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemos ingestion and retrieval pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all Mnemos crates.
#[derive(Debug, Error)]
pub enum MnemosError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database open, query failure, disk full).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A write kept hitting SQLITE_BUSY/SQLITE_LOCKED until retries ran out.
    #[error("storage busy after {attempts} attempts")]
    StorageBusy { attempts: u32 },

    /// Embedding provider errors (HTTP failure, malformed response).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Text extraction failed for a specific file.
    #[error("extraction failed for {}: {source}", path.display())]
    Extraction {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Stored and query embeddings disagree on dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Filesystem watcher errors (inotify limits, unwatchable roots).
    #[error("watcher error: {message}")]
    Watcher {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemosError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MnemosError::Storage {
            source: Box::new(err),
        }
    }
}
