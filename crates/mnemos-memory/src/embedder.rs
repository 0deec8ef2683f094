// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapters.
//!
//! - [`OllamaEmbedder`] calls a local Ollama server's `/api/embed`.
//! - [`PlaceholderEmbedder`] derives a deterministic vector from the text's
//!   SHA-256 digest, so the pipeline runs with no model at all.
//! - [`FallbackEmbedder`] wraps either one and never fails: errors and
//!   malformed responses are replaced by placeholder vectors, and every
//!   vector is fitted to the configured dimension.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mnemos_config::model::EmbeddingConfig;
use mnemos_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, MnemosError,
    PluginAdapter,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Deterministic vector for `text`: SHA-256 digest bytes as floats in
/// `0.0..=255.0`, repeated or cut to `dimensions`.
pub fn placeholder_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().cycle().take(dimensions).map(|&b| f32::from(b)).collect()
}

/// Fit a vector to exactly `dimensions` values.
///
/// Longer vectors are truncated; shorter ones are extended by repeating
/// their own values from the start. An empty vector becomes zeros.
pub fn fit_to_dimension(mut vector: Vec<f32>, dimensions: usize) -> Vec<f32> {
    if vector.len() >= dimensions {
        vector.truncate(dimensions);
        return vector;
    }
    if vector.is_empty() {
        return vec![0.0; dimensions];
    }
    let original = vector.len();
    vector.reserve(dimensions - original);
    for i in original..dimensions {
        vector.push(vector[i % original]);
    }
    vector
}

/// Build the adapter selected by `embedding.backend`.
///
/// Consumers wrap the result in a [`FallbackEmbedder`].
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingAdapter>, MnemosError> {
    match config.backend.as_str() {
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        "placeholder" => Ok(Arc::new(PlaceholderEmbedder::new(config.dimensions))),
        other => Err(MnemosError::Config(format!(
            "unknown embedding backend `{other}`"
        ))),
    }
}

/// Adapter producing [`placeholder_vector`]s.
#[derive(Debug, Clone)]
pub struct PlaceholderEmbedder {
    dimensions: usize,
}

impl PlaceholderEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl PluginAdapter for PlaceholderEmbedder {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for PlaceholderEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        let embeddings = input
            .texts
            .iter()
            .map(|t| placeholder_vector(t, self.dimensions))
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

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for an Ollama server's batch embedding endpoint.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Creates a client from the `[embedding]` config section.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, MnemosError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MnemosError::Embedding {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        match self.client.get(self.endpoint("/api/version")).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "server returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("unreachable: {e}"))),
        }
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        let request = EmbedRequest {
            model: &self.model,
            input: &input.texts,
        };

        let response = self
            .client
            .post(self.endpoint("/api/embed"))
            .json(&request)
            .send()
            .await
            .map_err(|e| MnemosError::Embedding {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, texts = input.texts.len(), "embedding response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MnemosError::Embedding {
                message: format!("Ollama returned {status}: {body}"),
                source: None,
            });
        }

        let body: EmbedResponse = response.json().await.map_err(|e| MnemosError::Embedding {
            message: format!("failed to parse embedding response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let dimensions = body.embeddings.first().map_or(0, Vec::len);
        Ok(EmbeddingOutput {
            embeddings: body.embeddings,
            dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Never-failing wrapper that normalizes provider output to D dimensions.
pub struct FallbackEmbedder {
    inner: Arc<dyn EmbeddingAdapter>,
    dimensions: usize,
}

impl FallbackEmbedder {
    pub fn new(inner: Arc<dyn EmbeddingAdapter>, dimensions: usize) -> Self {
        Self { inner, dimensions }
    }

    /// Wrap `inner`, fitting to the dimension it reports.
    pub fn wrap(inner: Arc<dyn EmbeddingAdapter>) -> Self {
        let dimensions = inner.dimensions();
        Self::new(inner, dimensions)
    }

    /// One D-length vector per text, in order.
    ///
    /// Falls back to placeholder vectors for the whole batch when the
    /// provider errors or returns the wrong number of vectors.
    pub async fn embed_texts(&self, texts: &[String]) -> Vec<Vec<f32>> {
        let input = EmbeddingInput {
            texts: texts.to_vec(),
        };
        match self.inner.embed(input).await {
            Ok(output) if output.embeddings.len() == texts.len() => output
                .embeddings
                .into_iter()
                .map(|v| fit_to_dimension(v, self.dimensions))
                .collect(),
            Ok(output) => {
                warn!(
                    provider = self.inner.name(),
                    expected = texts.len(),
                    got = output.embeddings.len(),
                    "embedding count mismatch, using placeholder vectors"
                );
                self.placeholders(texts)
            }
            Err(e) => {
                warn!(
                    provider = self.inner.name(),
                    error = %e,
                    "embedding failed, using placeholder vectors"
                );
                self.placeholders(texts)
            }
        }
    }

    fn placeholders(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts
            .iter()
            .map(|t| placeholder_vector(t, self.dimensions))
            .collect()
    }
}

#[async_trait]
impl PluginAdapter for FallbackEmbedder {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn version(&self) -> semver::Version {
        self.inner.version()
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl EmbeddingAdapter for FallbackEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        Ok(EmbeddingOutput {
            embeddings: self.embed_texts(&input.texts).await,
            dimensions: self.dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
