// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mnemos.toml` > `~/.config/mnemos/mnemos.toml` > `/etc/mnemos/mnemos.toml`
//! with environment variable overrides via the `MNEMOS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MnemosConfig;

/// Config sections that environment variables can address.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "queue",
    "indexer",
    "embedding",
    "watcher",
    "retrieval",
];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mnemos/mnemos.toml";

/// Local config file, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "mnemos.toml";

/// Per-user config file under the XDG config directory.
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("mnemos/mnemos.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mnemos/mnemos.toml`
/// 3. `~/.config/mnemos/mnemos.toml`
/// 4. `./mnemos.toml`
/// 5. `MNEMOS_*` environment variables
pub fn load_config() -> Result<MnemosConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MnemosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `MNEMOS_<SECTION>_<KEY>` to `section.key`.
///
/// Figment hands the key over in its original case, so it is lowercased
/// first. Only the first underscore after a known section name becomes a
/// dot, so `MNEMOS_STORAGE_EVENT_DB_PATH` maps to `storage.event_db_path`.
fn env_provider() -> Env {
    Env::prefixed("MNEMOS_").map(|key| env_key_to_path(&key.as_str().to_ascii_lowercase()).into())
}

/// Maps a lowercased, prefix-stripped env key to a dotted config path.
pub fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(env_key_to_path("storage_event_db_path"), "storage.event_db_path");
        assert_eq!(env_key_to_path("queue_write_retry_delay_ms"), "queue.write_retry_delay_ms");
        assert_eq!(env_key_to_path("indexer_chunk_overlap"), "indexer.chunk_overlap");
        assert_eq!(env_key_to_path("agent_log_level"), "agent.log_level");
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(env_key_to_path("llm_backend"), "llm_backend");
    }

    #[test]
    #[serial_test::serial]
    fn uppercase_env_vars_reach_their_section() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MNEMOS_INDEXER_BATCH_SIZE", "7");
            jail.set_env("MNEMOS_STORAGE_EVENT_DB_PATH", "/tmp/jail/events.db");
            jail.set_env("MNEMOS_AGENT_LOG_LEVEL", "debug");

            let config: MnemosConfig = Figment::new()
                .merge(Serialized::defaults(MnemosConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.indexer.batch_size, 7);
            assert_eq!(config.storage.event_db_path, "/tmp/jail/events.db");
            assert_eq!(config.agent.log_level, "debug");
            Ok(())
        });
    }
}
