// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of storage, embedder, and workers from one loaded config.

use std::path::PathBuf;
use std::sync::Arc;

use mnemos_config::MnemosConfig;
use mnemos_core::{EmbeddingAdapter, MnemosError};
use mnemos_memory::{FileTextExtractor, IndexWorker, Retriever, VectorStore, WatchFilter, build_embedder};
use mnemos_storage::database::OpenOptions;
use mnemos_storage::{Database, EventQueue, RetryPolicy};
use tracing::debug;

/// Shared handles every subcommand builds on.
pub struct Pipeline {
    pub config: MnemosConfig,
    pub queue: Arc<EventQueue>,
    pub store: Arc<VectorStore>,
    pub embedder: Arc<dyn EmbeddingAdapter>,
    /// Set only when vectors live in a different file from events.
    vector_db: Option<Database>,
}

impl Pipeline {
    /// Open the event and vector databases and build the embedder.
    ///
    /// When both paths name the same file, one connection serves both.
    pub async fn open(config: MnemosConfig) -> Result<Self, MnemosError> {
        let options = OpenOptions::from(&config.storage);
        let event_db = Database::open_with(&config.storage.event_db_path, options).await?;
        let vector_db = if config.storage.vector_db_path == config.storage.event_db_path {
            None
        } else {
            Some(Database::open_with(&config.storage.vector_db_path, options).await?)
        };
        debug!(
            events = %config.storage.event_db_path,
            vectors = %config.storage.vector_db_path,
            "databases opened"
        );

        let store = VectorStore::from_database(vector_db.as_ref().unwrap_or(&event_db))
            .with_retry(RetryPolicy::from(&config.queue));
        let store = Arc::new(store);
        let queue = Arc::new(EventQueue::from_config(event_db, &config.queue));
        let embedder = build_embedder(&config.embedding)?;

        Ok(Self {
            config,
            queue,
            store,
            embedder,
            vector_db,
        })
    }

    /// Indexing worker over this pipeline's queue and store.
    pub fn worker(&self) -> IndexWorker {
        IndexWorker::new(
            self.config.indexer.clone(),
            self.queue.clone(),
            self.store.clone(),
            self.embedder.clone(),
            Arc::new(FileTextExtractor::from_config(&self.config.indexer)),
        )
    }

    pub fn retriever(&self) -> Retriever {
        Retriever::new(self.store.clone(), self.embedder.clone())
    }

    /// Path filter that also ignores Mnemos's own database files.
    pub fn watch_filter(&self) -> WatchFilter {
        let own = [
            PathBuf::from(&self.config.storage.event_db_path),
            PathBuf::from(&self.config.storage.vector_db_path),
        ];
        WatchFilter::new(&self.config.watcher.exclude_patterns, &own)
    }

    /// Checkpoint both databases. Both are attempted; the first error wins.
    pub async fn close(&self) -> Result<(), MnemosError> {
        let events = self.queue.database().close().await;
        let vectors = match &self.vector_db {
            Some(db) => db.close().await,
            None => Ok(()),
        };
        events.and(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path, shared: bool) -> MnemosConfig {
        let mut config = MnemosConfig::default();
        config.storage.event_db_path = dir.join("events.db").to_string_lossy().into_owned();
        config.storage.vector_db_path = if shared {
            config.storage.event_db_path.clone()
        } else {
            dir.join("vectors.db").to_string_lossy().into_owned()
        };
        config.embedding.dimensions = 8;
        config
    }

    #[tokio::test]
    async fn opens_separate_databases() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::open(config_in(dir.path(), false)).await.unwrap();
        assert!(dir.path().join("events.db").exists());
        assert!(dir.path().join("vectors.db").exists());
        assert_eq!(pipeline.embedder.dimensions(), 8);
    }

    #[tokio::test]
    async fn close_checkpoints_the_vector_database() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::open(config_in(dir.path(), false)).await.unwrap();
        pipeline
            .store
            .upsert("/n/a.txt", "a", &[1.0; 8], 1.0, "h")
            .await
            .unwrap();
        let wal = dir.path().join("vectors.db-wal");
        assert!(std::fs::metadata(&wal).unwrap().len() > 0);

        pipeline.close().await.unwrap();
        assert_eq!(std::fs::metadata(&wal).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn shared_path_closes_once() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::open(config_in(dir.path(), true)).await.unwrap();
        pipeline.close().await.unwrap();
        assert!(!dir.path().join("vectors.db").exists());
    }

    #[tokio::test]
    async fn watch_filter_skips_own_databases() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::open(config_in(dir.path(), true)).await.unwrap();
        let filter = pipeline.watch_filter();
        assert!(!filter.should_record(&dir.path().join("events.db-wal")));
        assert!(filter.should_record(&dir.path().join("notes.txt")));
    }
}
