// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Mnemos.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! connection per database via `tokio-rusqlite`, and the durable event queue
//! that decouples the filesystem monitor from the indexing worker.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod queue;
pub mod writer;

pub use database::Database;
pub use models::{Event, EventType};
pub use queue::EventQueue;
pub use writer::RetryPolicy;
