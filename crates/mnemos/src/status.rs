// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos status` command implementation.
//!
//! Reports queue depth, record count, and embedder health. Works whether
//! or not a watcher or worker is currently running.

use mnemos_core::{EmbeddingAdapter, HealthStatus, MnemosError, PluginAdapter};
use serde::Serialize;

use crate::pipeline::Pipeline;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub pending_events: u64,
    pub total_events: u64,
    pub records: u64,
    pub embedder: String,
    pub embedder_health: String,
    pub dimensions: usize,
}

fn describe_health(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(why) => format!("degraded ({why})"),
        HealthStatus::Unhealthy(why) => format!("unhealthy ({why})"),
    }
}

/// Collect status counters from the pipeline's databases.
pub async fn collect_status(pipeline: &Pipeline) -> Result<StatusResponse, MnemosError> {
    let health = match pipeline.embedder.health_check().await {
        Ok(status) => describe_health(&status),
        Err(e) => format!("unhealthy ({e})"),
    };
    Ok(StatusResponse {
        pending_events: pipeline.queue.pending_count().await?,
        total_events: pipeline.queue.total_count().await?,
        records: pipeline.store.count().await?,
        embedder: pipeline.embedder.name().to_string(),
        embedder_health: health,
        dimensions: pipeline.embedder.dimensions(),
    })
}

/// Run the `mnemos status` command.
pub async fn run_status(pipeline: &Pipeline, json: bool) -> Result<(), MnemosError> {
    let status = collect_status(pipeline).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    println!();
    println!("  mnemos status");
    println!("  {}", "-".repeat(35));
    println!("    Events:   {} pending / {} total", status.pending_events, status.total_events);
    println!("    Records:  {}", status.records);
    println!(
        "    Embedder: {} (D={}, {})",
        status.embedder, status.dimensions, status.embedder_health
    );
    println!();
    Ok(())
}
