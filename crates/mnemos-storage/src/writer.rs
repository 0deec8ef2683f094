// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write-site retry for lock contention.
//!
//! Within one process, writes to a database are serialized through its
//! `tokio-rusqlite` thread. The watcher and the worker are separate
//! processes, so a write may still find the file locked. Such writes are
//! retried a bounded number of times with a fixed delay.

use std::future::Future;
use std::time::Duration;

use mnemos_config::model::QueueConfig;
use mnemos_core::MnemosError;
use tracing::debug;

use crate::database::is_busy;

/// Bounded fixed-delay retry for BUSY/LOCKED writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(100),
        }
    }
}

impl From<&QueueConfig> for RetryPolicy {
    fn from(config: &QueueConfig) -> Self {
        Self {
            attempts: config.write_retries.max(1),
            delay: Duration::from_millis(config.write_retry_delay_ms),
        }
    }
}

/// Run `op` until it succeeds, fails with a non-contention error, or the
/// policy's attempts are spent.
///
/// Exhaustion yields [`MnemosError::StorageBusy`].
pub async fn retry_on_busy<T, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, MnemosError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MnemosError>>,
{
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_busy(&e) => {
                debug!(what, attempt, attempts, "database busy");
                if attempt < attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
    Err(MnemosError::StorageBusy { attempts })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn busy() -> MnemosError {
        MnemosError::storage(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_busy() {
        let calls = AtomicU32::new(0);
        let result = retry_on_busy(fast(5), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(busy())
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_on_busy(fast(3), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(busy())
        })
        .await;
        assert!(matches!(result, Err(MnemosError::StorageBusy { attempts: 3 })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_on_busy(fast(5), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(MnemosError::Internal("boom".into()))
        })
        .await;
        assert!(matches!(result, Err(MnemosError::Internal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn policy_from_config() {
        let policy = RetryPolicy::from(&QueueConfig {
            write_retries: 0,
            write_retry_delay_ms: 5,
        });
        assert_eq!(policy.attempts, 1);
        assert_eq!(policy.delay, Duration::from_millis(5));
    }
}
