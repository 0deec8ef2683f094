// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring the full memory pipeline onto temporary storage.
//!
//! Provides a builder for assembling an event queue, vector store,
//! indexing worker, and retriever backed by a [`MockEmbedder`], so
//! integration tests can enqueue events, drain them, and query without
//! a model server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mnemos_config::model::IndexerConfig;
use mnemos_core::{EmbeddingAdapter, MnemosError};
use mnemos_memory::{CycleReport, FileTextExtractor, IndexWorker, Retriever, VectorStore};
use mnemos_storage::{Database, EventQueue, EventType, RetryPolicy};

use crate::mock_embedder::MockEmbedder;

/// Builder for constructing a [`TestHarness`].
pub struct TestHarnessBuilder {
    dimensions: usize,
    vectors: Vec<(String, Vec<f32>)>,
    indexer: IndexerConfig,
    separate_vector_db: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            dimensions: 8,
            vectors: Vec::new(),
            indexer: IndexerConfig::default(),
            separate_vector_db: false,
        }
    }

    /// Set the embedding dimension D.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Script the vector the mock embedder returns for `text`.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.push((text.into(), vector));
        self
    }

    /// Use a custom indexer configuration.
    pub fn with_indexer_config(mut self, config: IndexerConfig) -> Self {
        self.indexer = config;
        self
    }

    /// Keep memory records in a second database file.
    pub fn with_separate_vector_db(mut self) -> Self {
        self.separate_vector_db = true;
        self
    }

    /// Build the harness, creating databases in a fresh temp directory.
    pub async fn build(self) -> Result<TestHarness, MnemosError> {
        let temp_dir = tempfile::tempdir().map_err(|e| MnemosError::Internal(e.to_string()))?;

        let event_path = temp_dir.path().join("events.db");
        let event_db = Database::open(&event_path.to_string_lossy()).await?;
        let vector_db = if self.separate_vector_db {
            let path = temp_dir.path().join("memory_vectors.db");
            Database::open(&path.to_string_lossy()).await?
        } else {
            event_db.clone()
        };

        let queue = Arc::new(EventQueue::new(event_db, RetryPolicy::default()));
        let store = Arc::new(VectorStore::from_database(&vector_db));
        let embedder = Arc::new(MockEmbedder::with_vectors(self.dimensions, self.vectors));
        let dyn_embedder: Arc<dyn EmbeddingAdapter> = embedder.clone();

        let worker = IndexWorker::new(
            self.indexer,
            queue.clone(),
            store.clone(),
            dyn_embedder.clone(),
            Arc::new(FileTextExtractor::new()),
        );
        let retriever = Retriever::new(store.clone(), dyn_embedder);

        Ok(TestHarness {
            queue,
            store,
            worker,
            retriever,
            embedder,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete memory pipeline on temporary storage.
pub struct TestHarness {
    pub queue: Arc<EventQueue>,
    pub store: Arc<VectorStore>,
    pub worker: IndexWorker,
    pub retriever: Retriever,
    pub embedder: Arc<MockEmbedder>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Start building a harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Directory holding the databases; tests may create files here.
    pub fn dir(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Write a file under the temp directory and return its path string.
    pub fn write_file(&self, name: &str, contents: &str) -> Result<String, MnemosError> {
        let path: PathBuf = self.dir().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MnemosError::Internal(e.to_string()))?;
        }
        std::fs::write(&path, contents).map_err(|e| MnemosError::Internal(e.to_string()))?;
        Ok(path.to_string_lossy().into_owned())
    }

    /// Enqueue an event stamped with the current time.
    pub async fn enqueue(&self, event_type: EventType, path: &str) -> Result<i64, MnemosError> {
        self.queue
            .enqueue_now(event_type, path)
            .await?
            .ok_or_else(|| MnemosError::Internal("enqueue dropped under contention".into()))
    }

    /// Run worker cycles until the queue is drained, summing the reports.
    pub async fn drain(&self) -> Result<CycleReport, MnemosError> {
        let mut total = CycleReport::default();
        loop {
            let report = self.worker.run_cycle().await?;
            if report.is_idle() {
                return Ok(total);
            }
            total.fetched += report.fetched;
            total.indexed += report.indexed;
            total.skipped_missing += report.skipped_missing;
            total.skipped_empty += report.skipped_empty;
            total.failed += report.failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_indexes_and_retrieves() {
        let harness = TestHarness::builder()
            .with_dimensions(2)
            .with_vector("alpha", vec![1.0, 0.0])
            .build()
            .await
            .unwrap();
        let path = harness.write_file("a.txt", "alpha").unwrap();
        harness.enqueue(EventType::Created, &path).await.unwrap();

        let report = harness.drain().await.unwrap();
        assert_eq!(report.indexed, 1);

        let hits = harness.retriever.semantic_search("alpha", 1).await;
        assert_eq!(hits.len(), 1);
        assert!((hits[0].0 - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn separate_vector_db_keeps_queue_apart() {
        let harness = TestHarness::builder()
            .with_separate_vector_db()
            .build()
            .await
            .unwrap();
        let path = harness.write_file("notes/b.md", "bravo").unwrap();
        harness.enqueue(EventType::Modified, &path).await.unwrap();
        harness.drain().await.unwrap();

        assert_eq!(harness.store.count().await.unwrap(), 1);
        assert!(harness.dir().join("memory_vectors.db").exists());
    }
}
