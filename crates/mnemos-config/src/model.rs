// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Mnemos.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mnemos configuration.
///
/// Built once at process start and handed to each component's constructor.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemosConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Database file locations and SQLite tuning.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Event queue write behaviour under contention.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Indexing worker settings.
    #[serde(default)]
    pub indexer: IndexerConfig,

    /// Embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Filesystem monitor settings.
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Retrieval defaults.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage configuration.
///
/// The event queue and the vector store may share one file or live in two;
/// every database opened by Mnemos carries both tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite file holding the event queue.
    #[serde(default = "default_event_db_path")]
    pub event_db_path: String,

    /// Path to the SQLite file holding memory records.
    #[serde(default = "default_vector_db_path")]
    pub vector_db_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// SQLite `busy_timeout` in milliseconds. Zero leaves contention
    /// handling entirely to the write-site retry loop.
    #[serde(default)]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            event_db_path: default_event_db_path(),
            vector_db_path: default_vector_db_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: 0,
        }
    }
}

fn data_file(name: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("mnemos").join(name))
        .unwrap_or_else(|| std::path::PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}

fn default_event_db_path() -> String {
    data_file("events.db")
}

fn default_vector_db_path() -> String {
    data_file("memory_vectors.db")
}

fn default_wal_mode() -> bool {
    true
}

/// Event queue write configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Attempts made when the database reports BUSY/LOCKED.
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,

    /// Fixed delay between attempts, in milliseconds.
    #[serde(default = "default_write_retry_delay_ms")]
    pub write_retry_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            write_retries: default_write_retries(),
            write_retry_delay_ms: default_write_retry_delay_ms(),
        }
    }
}

fn default_write_retries() -> u32 {
    5
}

fn default_write_retry_delay_ms() -> u64 {
    100
}

/// Indexing worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexerConfig {
    /// Maximum unprocessed events fetched per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Idle wait between polls when the queue is empty, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Chunk window in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks. Must be below `chunk_size`.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Characters of extracted text kept as the record summary.
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,

    /// Program that prints a PDF's text to stdout, invoked as
    /// `<program> <file> -`. Empty disables PDF extraction.
    #[serde(default = "default_pdf_converter")]
    pub pdf_converter: String,

    /// Program that prints a DOCX's text to stdout, invoked as
    /// `<program> -t plain --wrap=none <file>`. Empty disables DOCX extraction.
    #[serde(default = "default_docx_converter")]
    pub docx_converter: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            poll_interval_ms: default_poll_interval_ms(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            summary_chars: default_summary_chars(),
            pdf_converter: default_pdf_converter(),
            docx_converter: default_docx_converter(),
        }
    }
}

fn default_batch_size() -> usize {
    10
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_chunk_size() -> usize {
    1200
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_summary_chars() -> usize {
    800
}

fn default_pdf_converter() -> String {
    "pdftotext".to_string()
}

fn default_docx_converter() -> String {
    "pandoc".to_string()
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Backend: "ollama" or "placeholder".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Fixed embedding dimension D. Provider output is fitted to this size.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Base URL of the Ollama server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model name sent to the backend.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            dimensions: default_dimensions(),
            base_url: default_base_url(),
            model: default_embedding_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Backends accepted by `embedding.backend`.
pub const EMBEDDING_BACKENDS: &[&str] = &["ollama", "placeholder"];

fn default_backend() -> String {
    "placeholder".to_string()
}

fn default_dimensions() -> usize {
    3072
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Filesystem monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WatcherConfig {
    /// Root directories watched recursively. Empty means the home directory.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Case-insensitive substrings; matching paths are never enqueued.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Debounce window for bursts of notifications, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            exclude_patterns: Vec::new(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    500
}

impl WatcherConfig {
    /// Roots to watch, falling back to the user's home directory.
    pub fn resolved_paths(&self) -> Vec<String> {
        if !self.paths.is_empty() {
            return self.paths.iter().map(|p| expand_home(p)).collect();
        }
        dirs::home_dir()
            .map(|h| vec![h.to_string_lossy().into_owned()])
            .unwrap_or_default()
    }
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &str) -> String {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{rest}", home.to_string_lossy())
        }
        _ => path.to_string(),
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Default number of results returned by semantic search.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}
