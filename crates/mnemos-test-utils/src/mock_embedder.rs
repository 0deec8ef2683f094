// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter for deterministic testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemos_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, MnemosError,
    PluginAdapter,
};
use mnemos_memory::embedder::placeholder_vector;

/// An embedding adapter returning scripted vectors.
///
/// Texts with a scripted vector get exactly that vector (whatever its
/// length); any other text gets the placeholder vector. The adapter can be
/// switched into a failing mode to exercise fallback paths.
pub struct MockEmbedder {
    dimensions: usize,
    scripted: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    /// Create a mock producing `dimensions`-long placeholder vectors.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            scripted: Arc::new(Mutex::new(HashMap::new())),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock pre-loaded with scripted vectors.
    pub fn with_vectors<I, S>(dimensions: usize, vectors: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut mock = Self::new(dimensions);
        let map: HashMap<String, Vec<f32>> =
            vectors.into_iter().map(|(t, v)| (t.into(), v)).collect();
        mock.scripted = Arc::new(Mutex::new(map));
        mock
    }

    /// Script the vector returned for `text`.
    pub async fn set_vector(&self, text: &str, vector: Vec<f32>) {
        self.scripted.lock().await.insert(text.to_string(), vector);
    }

    /// Make every subsequent `embed` call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("scripted failure".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MnemosError::Embedding {
                message: "mock embedder scripted failure".into(),
                source: None,
            });
        }

        let scripted = self.scripted.lock().await;
        let embeddings = input
            .texts
            .iter()
            .map(|t| {
                scripted
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| placeholder_vector(t, self.dimensions))
            })
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
