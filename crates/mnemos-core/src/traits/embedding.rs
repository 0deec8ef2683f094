// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter that maps a batch of texts to fixed-dimension vectors.
///
/// Implementations may fail; callers on the indexing path wrap them in a
/// fallback that substitutes deterministic placeholder vectors.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates one embedding per input text, preserving order.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError>;

    /// The fixed dimension D of vectors this adapter produces.
    fn dimensions(&self) -> usize;
}
