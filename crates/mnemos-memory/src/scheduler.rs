// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idle-wait policy for the indexing worker.

use std::time::Duration;

use async_trait::async_trait;

/// Decides how long the worker waits after a cycle that found no work.
#[async_trait]
pub trait IdleScheduler: Send + Sync {
    /// Suspend until the next poll should happen.
    async fn idle(&self);
}

/// Sleeps for the same interval every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl IdleScheduler for FixedInterval {
    async fn idle(&self) {
        tokio::time::sleep(self.interval).await;
    }
}
