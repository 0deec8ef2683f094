// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types and vector helpers.

use serde::{Deserialize, Serialize};

/// Guards cosine similarity against zero-norm vectors.
pub const NORM_EPSILON: f32 = 1e-8;

/// One indexed document: its summary, embedding, and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: i64,
    /// Document path; at most one record exists per path.
    pub path: String,
    /// Leading slice of the extracted text, `"..."`-suffixed when cut.
    pub summary: String,
    /// Document embedding of length D.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// Time of the event that produced this record, seconds since epoch.
    pub timestamp: f64,
    /// Hex SHA-256 of the full extracted text.
    pub content_hash: String,
}

/// A record with its similarity to a query.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    /// Cosine similarity in [-1, 1].
    pub score: f32,
    pub record: MemoryRecord,
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector. Trailing partial words are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity `dot / (max(|a|, eps) * max(|b|, eps))`.
///
/// Zero vectors score 0 instead of dividing by zero. Callers must pass
/// equal-length slices; extra elements of the longer one are ignored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a.max(NORM_EPSILON) * norm_b.max(NORM_EPSILON))
}

/// Element-wise mean of equal-length vectors. Empty input yields an empty vector.
pub fn mean_vector(vectors: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0_f32; first.len()];
    for v in vectors {
        for (acc, x) in sum.iter_mut().zip(v) {
            *acc += x;
        }
    }
    let n = vectors.len() as f32;
    sum.iter_mut().for_each(|x| *x /= n);
    sum
}
