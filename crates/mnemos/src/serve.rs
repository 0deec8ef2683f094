// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos watch`, `mnemos index`, and `mnemos run`.
//!
//! The watcher and the worker are independent producers and consumers of
//! the event queue; `run` starts both in one process under a shared
//! shutdown token.

use mnemos_core::MnemosError;
use mnemos_memory::{FixedInterval, run_watcher};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::pipeline::Pipeline;

/// Run the filesystem monitor until `cancel` fires.
pub async fn run_watch(pipeline: &Pipeline, cancel: CancellationToken) -> Result<(), MnemosError> {
    info!(roots = ?pipeline.config.watcher.resolved_paths(), "starting file watcher");
    run_watcher(
        &pipeline.config.watcher,
        pipeline.watch_filter(),
        pipeline.queue.clone(),
        cancel,
    )
    .await
}

/// Run the indexing worker.
///
/// With `once`, a single cycle runs and its report is printed.
pub async fn run_index(
    pipeline: &Pipeline,
    once: bool,
    cancel: CancellationToken,
) -> Result<(), MnemosError> {
    let worker = pipeline.worker();
    if once {
        let report = worker.run_cycle().await?;
        println!(
            "fetched {} event(s): {} indexed, {} missing, {} empty, {} failed",
            report.fetched,
            report.indexed,
            report.skipped_missing,
            report.skipped_empty,
            report.failed
        );
        return Ok(());
    }

    let scheduler = FixedInterval::from_millis(pipeline.config.indexer.poll_interval_ms);
    worker.run(&scheduler, cancel).await;
    Ok(())
}

/// Run watcher and worker together until shutdown.
pub async fn run_serve(pipeline: &Pipeline, cancel: CancellationToken) -> Result<(), MnemosError> {
    info!("starting mnemos");
    let watch = run_watch(pipeline, cancel.clone());
    let index = run_index(pipeline, false, cancel.clone());

    let (watch_result, index_result) = tokio::join!(
        async {
            let result = watch.await;
            if let Err(e) = &result {
                error!(error = %e, "file watcher failed");
                cancel.cancel();
            }
            result
        },
        index
    );
    info!("mnemos stopped");
    watch_result.and(index_result)
}
