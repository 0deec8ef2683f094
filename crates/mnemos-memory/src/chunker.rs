// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size character windows with overlap.
//!
//! Windows are measured in Unicode scalar values, never bytes, so a chunk
//! boundary cannot split a multi-byte character.

/// Chunking parameters, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    /// Shared with the following window. Must be below `chunk_size`.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            overlap: 200,
        }
    }
}

/// One window of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    /// Character offset of the first character.
    pub start: usize,
    pub text: String,
}

/// Split `text` into windows of at most `chunk_size` characters, each
/// starting `chunk_size - overlap` characters after the previous one.
///
/// The last window ends at the end of the text; no window is wholly
/// contained in its predecessor. Empty text yields no chunks. An overlap
/// not below the window size is clamped so the split always advances.
pub fn split_text(text: &str, config: ChunkingConfig) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let size = config.chunk_size.max(1);
    let step = size - config.overlap.min(size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            text: chars[start..end].iter().collect(),
        });
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
