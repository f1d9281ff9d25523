// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background replay loop.
//!
//! Waits for a reason to drain (a sync request, the connection coming back,
//! or the poll timer) and drains while online. A drain stopped by the network
//! is retried with exponential backoff. A drain stopped by a rejected
//! credential is not retried until a credential is stored again or a sync is
//! explicitly requested.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::backend::Backend;
use super::engine::SyncEngine;
use super::replayer::HaltReason;
use super::trigger::NotifyTrigger;

/// Timing for the background worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// First retry delay after a network halt.
    pub initial_delay: Duration,
    /// Upper bound for the retry delay.
    pub max_delay: Duration,
    /// Idle interval between opportunistic drains.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            poll_interval: Duration::from_secs(30),
        }
    }
}

/// Exponential backoff with a ceiling.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Option<Duration>,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Backoff {
            initial,
            max,
            current: None,
        }
    }

    /// The next delay: the initial delay first, then doubling up to the max.
    pub fn next_delay(&mut self) -> Duration {
        let next = match self.current {
            None => self.initial,
            Some(d) => std::cmp::min(d.saturating_mul(2), self.max),
        };
        let next = std::cmp::min(next, self.max);
        self.current = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Run the replay loop until cancelled.
pub async fn run_worker<B: Backend>(
    engine: Arc<SyncEngine<B>>,
    trigger: Arc<NotifyTrigger>,
    mut online: watch::Receiver<bool>,
    config: WorkerConfig,
    cancel: CancellationToken,
) {
    let mut backoff = Backoff::new(config.initial_delay, config.max_delay);
    // Drain once at startup: writes may have been queued by an earlier session.
    let mut wait = Duration::ZERO;
    let mut awaiting_login = false;

    loop {
        let requested = tokio::select! {
            _ = cancel.cancelled() => break,
            _ = trigger.notified() => {
                tracing::debug!("sync requested");
                true
            }
            changed = online.changed() => {
                if changed.is_err() {
                    tracing::debug!("connectivity source closed, stopping worker");
                    break;
                }
                if !*online.borrow_and_update() {
                    continue;
                }
                tracing::info!("connection restored");
                backoff.reset();
                false
            }
            _ = tokio::time::sleep(wait) => false,
        };

        if awaiting_login {
            if !requested && !engine.has_credential() {
                wait = config.poll_interval;
                continue;
            }
            tracing::info!("resuming sync");
            awaiting_login = false;
        }

        if !engine.is_online() {
            wait = config.poll_interval;
            continue;
        }

        wait = match engine.drain().await {
            Ok(report) if report.halted_by_network() => {
                let delay = backoff.next_delay();
                tracing::info!(
                    "drain halted with {} pending, retrying in {:?}",
                    report.remaining,
                    delay
                );
                delay
            }
            Ok(report) if report.halted == Some(HaltReason::Unauthorized) => {
                tracing::warn!(
                    "credential rejected, {} write(s) wait for 'svsync login'",
                    report.remaining
                );
                awaiting_login = true;
                backoff.reset();
                config.poll_interval
            }
            Ok(report) => {
                if !report.applied.is_empty() || !report.discarded.is_empty() {
                    tracing::info!(
                        "drain applied {}, discarded {}, {} remaining",
                        report.applied.len(),
                        report.discarded.len(),
                        report.remaining
                    );
                }
                backoff.reset();
                config.poll_interval
            }
            Err(e) => {
                let delay = backoff.next_delay();
                tracing::error!("drain failed: {}; retrying in {:?}", e, delay);
                delay
            }
        };
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
