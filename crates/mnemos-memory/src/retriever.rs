// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic retrieval over the vector store.
//!
//! Queries are embedded through the same fallback path the worker uses for
//! chunks, so placeholder-indexed stores stay searchable.

use std::sync::Arc;

use mnemos_core::{EmbeddingAdapter, MnemosError};
use tracing::warn;

use crate::embedder::FallbackEmbedder;
use crate::store::VectorStore;
use crate::types::ScoredRecord;

/// Nearest-neighbour search by query text.
pub struct Retriever {
    store: Arc<VectorStore>,
    embedder: FallbackEmbedder,
}

impl Retriever {
    pub fn new(store: Arc<VectorStore>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self {
            store,
            embedder: FallbackEmbedder::wrap(embedder),
        }
    }

    async fn embed_query(&self, query: &str) -> Vec<f32> {
        self.embedder
            .embed_texts(&[query.to_string()])
            .await
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    /// Up to `top_k` `(score, summary)` pairs, best first.
    ///
    /// Storage failures are logged and yield an empty result.
    pub async fn semantic_search(&self, query: &str, top_k: usize) -> Vec<(f32, String)> {
        match self.search_records(query, top_k).await {
            Ok(hits) => hits
                .into_iter()
                .map(|hit| (hit.score, hit.record.summary))
                .collect(),
            Err(e) => {
                warn!(error = %e, "semantic search failed");
                Vec::new()
            }
        }
    }

    /// Up to `top_k` full records, best first. Errors propagate.
    pub async fn search_records(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, MnemosError> {
        let embedding = self.embed_query(query).await;
        self.store.search(&embedding, top_k).await
    }
}
