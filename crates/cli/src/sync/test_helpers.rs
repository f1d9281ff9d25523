// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use svq_core::{QueueStore, DEFAULT_CAPACITY};

use super::backend_tests::MockBackend;
use super::connectivity::ConnectivityFlag;
use super::credentials::MemoryCredentials;
use super::engine::SyncEngine;
use super::lock::DrainLock;
use super::trigger::NotifyTrigger;

/// An engine wired to mocks, plus handles to drive them.
pub struct Harness {
    pub engine: Arc<SyncEngine<MockBackend>>,
    pub backend: MockBackend,
    pub connectivity: Arc<ConnectivityFlag>,
    pub trigger: Arc<NotifyTrigger>,
    pub credentials: Arc<MemoryCredentials>,
}

/// Create an engine over an in-memory queue, logged in and online.
pub fn harness() -> Harness {
    harness_with_store(QueueStore::open_in_memory(DEFAULT_CAPACITY).unwrap(), MockBackend::new())
}

/// Same as [`harness`] with an explicit store and backend.
pub fn harness_with_store(store: QueueStore, backend: MockBackend) -> Harness {
    build(store, backend, None)
}

/// An engine over `dir/queue.db` guarded by `dir/drain.lock`, the way a
/// process opens a shared home. Several of these may point at one `dir`.
pub fn harness_in_dir(dir: &Path, backend: MockBackend) -> Harness {
    let store = QueueStore::open(&dir.join("queue.db"), DEFAULT_CAPACITY).unwrap();
    build(store, backend, Some(DrainLock::new(dir.join("drain.lock"))))
}

fn build(store: QueueStore, backend: MockBackend, lock: Option<DrainLock>) -> Harness {
    let connectivity = Arc::new(ConnectivityFlag::with_state(true));
    let trigger = Arc::new(NotifyTrigger::new());
    let credentials = Arc::new(MemoryCredentials::new(Some("secret")));
    let mut engine = SyncEngine::new(backend.clone(), store, credentials.clone())
        .with_connectivity(connectivity.clone())
        .with_trigger(trigger.clone());
    if let Some(lock) = lock {
        engine = engine.with_drain_lock(lock);
    }
    Harness {
        engine: Arc::new(engine),
        backend,
        connectivity,
        trigger,
        credentials,
    }
}
