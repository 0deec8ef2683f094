// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemos integration tests.
//!
//! Provides a scripted embedding adapter and a harness that wires the
//! queue, vector store, worker, and retriever onto a temp database, so
//! pipeline tests run without a model server.
//!
//! # Components
//!
//! - [`MockEmbedder`] - Embedding adapter with per-text scripted vectors
//! - [`TestHarness`] - Complete pipeline on temporary storage

pub mod harness;
pub mod mock_embedder;

pub use harness::TestHarness;
pub use mock_embedder::MockEmbedder;
