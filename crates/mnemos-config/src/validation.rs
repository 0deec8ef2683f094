// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express, such as the chunk
//! overlap staying below the chunk window.

use crate::diagnostic::ConfigError;
use crate::model::{EMBEDDING_BACKENDS, MnemosConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing on the first one.
pub fn validate_config(config: &MnemosConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        )));
    }

    if config.storage.event_db_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.event_db_path must not be empty"));
    }
    if config.storage.vector_db_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.vector_db_path must not be empty"));
    }

    if config.queue.write_retries == 0 {
        errors.push(ConfigError::validation("queue.write_retries must be at least 1"));
    }

    let indexer = &config.indexer;
    if indexer.batch_size == 0 {
        errors.push(ConfigError::validation("indexer.batch_size must be at least 1"));
    }
    if indexer.chunk_size == 0 {
        errors.push(ConfigError::validation("indexer.chunk_size must be at least 1"));
    }
    if indexer.chunk_overlap >= indexer.chunk_size {
        errors.push(ConfigError::validation(format!(
            "indexer.chunk_overlap ({}) must be smaller than indexer.chunk_size ({})",
            indexer.chunk_overlap, indexer.chunk_size
        )));
    }
    if indexer.summary_chars == 0 {
        errors.push(ConfigError::validation("indexer.summary_chars must be at least 1"));
    }

    let embedding = &config.embedding;
    if !EMBEDDING_BACKENDS.contains(&embedding.backend.as_str()) {
        errors.push(ConfigError::validation(format!(
            "embedding.backend must be one of {}, got `{}`",
            EMBEDDING_BACKENDS.join(", "),
            embedding.backend
        )));
    }
    if embedding.dimensions == 0 {
        errors.push(ConfigError::validation("embedding.dimensions must be at least 1"));
    }
    if embedding.backend == "ollama" && embedding.base_url.trim().is_empty() {
        errors.push(ConfigError::validation(
            "embedding.base_url must be set when embedding.backend is `ollama`",
        ));
    }

    for (i, pattern) in config.watcher.exclude_patterns.iter().enumerate() {
        if pattern.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "watcher.exclude_patterns[{i}] must not be empty"
            )));
        }
    }

    if config.retrieval.top_k == 0 {
        errors.push(ConfigError::validation("retrieval.top_k must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
