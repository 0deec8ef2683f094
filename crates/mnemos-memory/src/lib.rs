// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion and retrieval for the Mnemos semantic memory.
//!
//! ## Architecture
//!
//! - **FsWatcher**: debounced recursive watches that enqueue file changes
//! - **IndexWorker**: drains the event queue into the vector store
//! - **FileTextExtractor**: plain-text, HTML, PDF, and DOCX extraction
//! - **Embedders**: Ollama HTTP, deterministic placeholder, and the
//!   never-failing fallback wrapper
//! - **VectorStore**: SQLite BLOB embeddings with brute-force cosine search
//! - **Retriever**: query embedding plus nearest-neighbour lookup
//! - **context**: prompt-ready rendering of hits and recent activity

pub mod chunker;
pub mod context;
pub mod embedder;
pub mod extractor;
pub mod indexer;
pub mod retriever;
pub mod scheduler;
pub mod store;
pub mod types;
pub mod watcher;

pub use embedder::{FallbackEmbedder, OllamaEmbedder, PlaceholderEmbedder, build_embedder};
pub use extractor::FileTextExtractor;
pub use indexer::{CycleReport, IndexWorker};
pub use retriever::Retriever;
pub use scheduler::{FixedInterval, IdleScheduler};
pub use store::VectorStore;
pub use types::*;
pub use watcher::{FsWatcher, WatchFilter, run_watcher};
