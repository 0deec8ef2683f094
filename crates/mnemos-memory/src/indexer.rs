// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background indexing worker.
//!
//! Drains the event queue in id order. For each event the referenced file
//! is extracted, hashed, chunked, embedded, and upserted into the vector
//! store. Every fetched event is marked processed whatever the outcome,
//! so a bad file cannot wedge the queue.

use std::path::Path;
use std::sync::Arc;

use mnemos_config::model::IndexerConfig;
use mnemos_core::{EmbeddingAdapter, MnemosError, TextExtractor};
use mnemos_storage::{Event, EventQueue};
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::chunker::{ChunkingConfig, split_text};
use crate::embedder::FallbackEmbedder;
use crate::scheduler::IdleScheduler;
use crate::store::VectorStore;
use crate::types::mean_vector;

/// Counters for one poll of the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub indexed: usize,
    pub skipped_missing: usize,
    pub skipped_empty: usize,
    pub failed: usize,
}

impl CycleReport {
    /// True when the queue had nothing to offer.
    pub fn is_idle(&self) -> bool {
        self.fetched == 0
    }
}

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Indexed,
    /// The path no longer exists; the store is left alone.
    SkippedMissing,
    /// Nothing extractable.
    SkippedEmpty,
}

/// The first `max_chars` characters of `text`, with `"..."` appended when
/// anything was cut.
pub fn summarize(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Hex SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Consumes queue events and keeps the vector store current.
pub struct IndexWorker {
    config: IndexerConfig,
    queue: Arc<EventQueue>,
    store: Arc<VectorStore>,
    embedder: FallbackEmbedder,
    extractor: Arc<dyn TextExtractor>,
}

impl IndexWorker {
    /// Creates a worker. The embedder is wrapped so provider failures fall
    /// back to placeholder vectors of its reported dimension.
    pub fn new(
        config: IndexerConfig,
        queue: Arc<EventQueue>,
        store: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            config,
            queue,
            store,
            embedder: FallbackEmbedder::wrap(embedder),
            extractor,
        }
    }

    fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.config.chunk_size,
            overlap: self.config.chunk_overlap,
        }
    }

    /// Process one batch of unprocessed events.
    ///
    /// Per-event failures are logged and counted. Failing to read the queue
    /// or to mark an event processed aborts the cycle with an error.
    pub async fn run_cycle(&self) -> Result<CycleReport, MnemosError> {
        let events = self.queue.fetch_unprocessed(self.config.batch_size).await?;
        let mut report = CycleReport {
            fetched: events.len(),
            ..CycleReport::default()
        };

        for event in events {
            match self.process_event(&event).await {
                Ok(EventOutcome::Indexed) => report.indexed += 1,
                Ok(EventOutcome::SkippedMissing) => {
                    debug!(id = event.id, path = %event.path, "path missing, skipped");
                    report.skipped_missing += 1;
                }
                Ok(EventOutcome::SkippedEmpty) => {
                    debug!(id = event.id, path = %event.path, "no extractable text, skipped");
                    report.skipped_empty += 1;
                }
                Err(e) => {
                    error!(id = event.id, path = %event.path, error = %e, "failed to index event");
                    report.failed += 1;
                }
            }
            self.queue.mark_processed(event.id).await?;
        }

        if !report.is_idle() {
            debug!(?report, "cycle complete");
        }
        Ok(report)
    }

    /// Index the file an event refers to.
    pub async fn process_event(&self, event: &Event) -> Result<EventOutcome, MnemosError> {
        let path = Path::new(&event.path);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Ok(EventOutcome::SkippedMissing);
        }

        let text = self.extractor.extract(path).await;
        if text.is_empty() {
            return Ok(EventOutcome::SkippedEmpty);
        }

        let sha = content_hash(&text);
        let summary = summarize(&text, self.config.summary_chars);
        let chunks: Vec<String> = split_text(&text, self.chunking())
            .into_iter()
            .map(|c| c.text)
            .collect();

        let vectors = self.embedder.embed_texts(&chunks).await;
        let embedding = mean_vector(&vectors);

        self.store
            .upsert(&event.path, &summary, &embedding, event.timestamp, &sha)
            .await?;
        info!(path = %event.path, chunks = chunks.len(), "indexed");
        Ok(EventOutcome::Indexed)
    }

    /// Poll until `cancel` fires, idling on `scheduler` whenever a cycle
    /// finds no work or cannot read the queue.
    pub async fn run(&self, scheduler: &dyn IdleScheduler, cancel: CancellationToken) {
        info!(batch_size = self.config.batch_size, "indexing worker started");
        while !cancel.is_cancelled() {
            let idle = match self.run_cycle().await {
                Ok(report) => report.is_idle(),
                Err(e) => {
                    error!(error = %e, "indexing cycle failed");
                    true
                }
            };
            if idle {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = scheduler.idle() => {}
                }
            }
        }
        info!("indexing worker stopped");
    }
}
