// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos search` command implementation.

use mnemos_core::MnemosError;
use mnemos_memory::context::build_context_block;
use serde::Serialize;

use crate::pipeline::Pipeline;

/// Number of recent events shown alongside search hits.
const RECENT_EVENTS: usize = 5;

/// One hit in `--json` output.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub score: f32,
    pub path: String,
    pub summary: String,
    pub timestamp: f64,
}

/// Run a semantic search and print the results.
///
/// Plain output is the prompt-ready context block; `--json` prints the
/// hits only.
pub async fn run_search(
    pipeline: &Pipeline,
    query: &str,
    top_k: Option<usize>,
    json: bool,
) -> Result<(), MnemosError> {
    let top_k = top_k.unwrap_or(pipeline.config.retrieval.top_k);
    let hits = pipeline.retriever().search_records(query, top_k).await?;

    if json {
        let hits: Vec<SearchHit> = hits
            .into_iter()
            .map(|hit| SearchHit {
                score: hit.score,
                path: hit.record.path,
                summary: hit.record.summary,
                timestamp: hit.record.timestamp,
            })
            .collect();
        let out = serde_json::to_string_pretty(&hits)
            .map_err(|e| MnemosError::Internal(format!("failed to serialize results: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    let recent = pipeline.queue.recent(RECENT_EVENTS).await?;
    let block = build_context_block(&hits, &recent);
    if block.is_empty() {
        println!("no results");
    } else {
        println!("{block}");
    }
    Ok(())
}
