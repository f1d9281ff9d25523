// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue replayer: drains queued mutations against the backend in order.
//!
//! For each mutation, oldest first:
//! - success: removed (creates also record their server id)
//! - error response: moved to the dead-letter log, drain continues
//! - no response: attempt recorded, drain stops, everything after it stays
//! - unauthorized: credential cleared, drain stops, queue kept for re-login
//!
//! Only one drain runs at a time per engine, and with a [`DrainLock`] only
//! one per queue file across processes. A drain that cannot get the right to
//! run returns a skipped report without touching the network.
//!
//! [`DrainLock`]: super::lock::DrainLock

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use svq_core::{remap, Method, MutationId};

use super::backend::{ApiRequest, Backend, CallError};
use super::engine::{SyncEngine, SyncError, SyncResult};

/// Why a drain stopped before emptying the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum HaltReason {
    /// The server could not be reached.
    Network(String),
    /// The credential was rejected.
    Unauthorized,
}

/// A mutation dropped because the server rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discarded {
    pub id: MutationId,
    pub status: u16,
    pub message: String,
}

/// Outcome of one drain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Mutations applied and removed, in replay order.
    pub applied: Vec<MutationId>,
    /// Mutations removed because they can never succeed.
    pub discarded: Vec<Discarded>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<HaltReason>,
    /// Mutations still queued afterwards.
    pub remaining: usize,
    /// Another drain was already running; nothing was done.
    pub skipped: bool,
}

impl DrainReport {
    fn skipped() -> Self {
        DrainReport {
            skipped: true,
            ..Default::default()
        }
    }

    /// True if the drain stopped because the server was unreachable.
    pub fn halted_by_network(&self) -> bool {
        matches!(self.halted, Some(HaltReason::Network(_)))
    }
}

/// Holds the drain flag for the lifetime of a drain.
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard { flag })
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl<B: Backend> SyncEngine<B> {
    /// True while a drain is running.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Replay queued mutations until the queue is empty or progress stops.
    pub async fn drain(&self) -> SyncResult<DrainReport> {
        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            tracing::debug!("drain already in progress, skipping");
            return Ok(DrainReport::skipped());
        };
        let _file_lock = match &self.drain_lock {
            Some(lock) => match lock.try_acquire().map_err(SyncError::Lock)? {
                Some(file) => Some(file),
                None => {
                    tracing::debug!("queue is being drained by another process, skipping");
                    return Ok(DrainReport::skipped());
                }
            },
            None => None,
        };

        // Nothing else can be replaying now, so leftovers are from a crash.
        let recovered = self.store.recover_in_flight()?;
        if recovered > 0 {
            tracing::info!("recovered {} mutation(s) left in flight", recovered);
        }

        let pending = self.store.peek_all()?;
        let mut report = DrainReport::default();
        if pending.is_empty() {
            return Ok(report);
        }
        tracing::info!("draining {} queued mutation(s)", pending.len());

        for mutation in pending {
            // Re-read each time: a create earlier in this drain may have added a mapping.
            let map = self.store.id_map()?;
            let (endpoint, payload) = remap::resolve(&mutation.endpoint, &mutation.payload, &map);

            self.store.mark_in_flight(mutation.id)?;
            let request = ApiRequest::new(mutation.method, endpoint, Some(payload))
                .with_token(self.credentials.token());

            match self.backend.call(request).await {
                Ok(response) => {
                    let real_id = match mutation.method {
                        Method::Create => remap::extract_id(&response, &self.options.id_pointer),
                        _ => None,
                    };
                    match (mutation.placeholder_id(), real_id) {
                        (Some(placeholder), Some(real_id)) => {
                            tracing::debug!(
                                "mutation #{} applied, {} -> {}",
                                mutation.id,
                                placeholder,
                                real_id
                            );
                            self.store.complete_create(mutation.id, &placeholder, &real_id)?;
                        }
                        (Some(placeholder), None) => {
                            tracing::warn!(
                                "mutation #{} applied but response has no id; {} stays unresolved",
                                mutation.id,
                                placeholder
                            );
                            self.store.remove(mutation.id)?;
                        }
                        _ => {
                            tracing::debug!("mutation #{} applied", mutation.id);
                            self.store.remove(mutation.id)?;
                        }
                    }
                    report.applied.push(mutation.id);
                }
                Err(CallError::Application { status, message }) => {
                    tracing::warn!(
                        "mutation #{} ({} {}) rejected with {}, discarding: {}",
                        mutation.id,
                        mutation.method,
                        mutation.endpoint,
                        status,
                        message
                    );
                    self.store.discard(mutation.id, Some(status), &message)?;
                    report.discarded.push(Discarded {
                        id: mutation.id,
                        status,
                        message,
                    });
                }
                Err(CallError::Network(msg)) => {
                    tracing::info!("mutation #{} unreachable, halting drain: {}", mutation.id, msg);
                    self.store.mark_failed(mutation.id, &msg)?;
                    report.halted = Some(HaltReason::Network(msg));
                    break;
                }
                Err(CallError::Unauthorized) => {
                    tracing::warn!("credential rejected while replaying #{}", mutation.id);
                    self.store.mark_failed(mutation.id, "unauthorized")?;
                    self.clear_credentials();
                    report.halted = Some(HaltReason::Unauthorized);
                    break;
                }
            }
        }

        report.remaining = self.store.len()?;
        Ok(report)
    }
}
