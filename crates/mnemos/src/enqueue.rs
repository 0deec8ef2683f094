// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos enqueue`: record an event by hand, as any producer would.

use std::path::Path;

use mnemos_core::MnemosError;
use mnemos_storage::EventType;
use tracing::warn;

use crate::pipeline::Pipeline;

/// Enqueue `event_type` for `path`, stamped with the current time.
///
/// Relative paths are made absolute against the working directory so the
/// worker resolves them the same way from any process.
pub async fn run_enqueue(
    pipeline: &Pipeline,
    event_type: &str,
    path: &str,
) -> Result<(), MnemosError> {
    let path = absolutize(Path::new(path))?;
    match pipeline
        .queue
        .enqueue_now(EventType::from(event_type), &path)
        .await?
    {
        Some(id) => println!("enqueued event {id}: {event_type} {path}"),
        None => {
            warn!(path = %path, "event dropped, database busy");
            return Err(MnemosError::Internal(
                "event dropped: database stayed busy".into(),
            ));
        }
    }
    Ok(())
}

fn absolutize(path: &Path) -> Result<String, MnemosError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| MnemosError::Internal(format!("cannot resolve working directory: {e}")))?
            .join(path)
    };
    Ok(absolute.to_string_lossy().into_owned())
}
