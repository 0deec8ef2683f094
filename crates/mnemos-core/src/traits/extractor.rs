// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text extractor trait: path in, text (or nothing) out.

use std::path::Path;

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;

/// Turns a file into indexable text.
///
/// Never fails: an unsupported or unreadable file yields an empty string.
#[async_trait]
pub trait TextExtractor: PluginAdapter {
    async fn extract(&self, path: &Path) -> String;
}
