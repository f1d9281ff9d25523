// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync trigger: asks the host to run the replayer when it can.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;

/// Best-effort request for a replay opportunity.
pub trait SyncTrigger: Send + Sync {
    fn request_sync(&self);
}

/// Host without a background facility. Replay happens on the next explicit
/// drain or the next time a worker is running.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrigger;

impl SyncTrigger for NoopTrigger {
    fn request_sync(&self) {
        tracing::debug!("sync requested, no background worker attached");
    }
}

/// Wakes an in-process background worker.
#[derive(Debug, Default)]
pub struct NotifyTrigger {
    notify: Notify,
    requests: AtomicU64,
}

impl NotifyTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the next request. A request made while nobody was waiting
    /// is remembered and completes the next wait immediately.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    /// Total number of requests so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Acquire)
    }
}

impl SyncTrigger for NotifyTrigger {
    fn request_sync(&self) {
        self.requests.fetch_add(1, Ordering::AcqRel);
        self.notify.notify_one();
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
