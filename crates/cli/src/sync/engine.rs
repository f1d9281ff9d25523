// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync engine: one service owning the offline queue.
//!
//! A [`SyncEngine`] is constructed once and shared (usually behind an `Arc`)
//! with everything that issues writes. It bundles:
//! - the durable [`QueueStore`]
//! - the [`Backend`] that performs real calls
//! - a [`Connectivity`] oracle and a [`SyncTrigger`]
//! - the [`CredentialStore`] holding the bearer token
//! - optionally a [`DrainLock`] shared with other processes using the queue
//!
//! Writes go through [`SyncEngine::perform`] (see `interceptor.rs`) and queued
//! writes are replayed by [`SyncEngine::drain`] (see `replayer.rs`).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use svq_core::QueueStore;

use super::backend::Backend;
use super::connectivity::{Connectivity, ConnectivityFlag};
use super::credentials::CredentialStore;
use super::lock::DrainLock;
use super::trigger::{NoopTrigger, SyncTrigger};

/// Error type for sync engine operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Queue storage error, including a full queue.
    #[error(transparent)]
    Store(#[from] svq_core::Error),

    /// The server rejected the request; it was not queued.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The credential was rejected; it has been cleared.
    #[error("not authenticated: credential rejected\n  hint: log in again at {login_url}")]
    Unauthorized { login_url: String },

    /// A read could not reach the server. Reads are never queued.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// Credential storage error.
    #[error("credential error: {0}")]
    Credentials(#[from] std::io::Error),

    /// The drain lock file could not be opened or locked.
    #[error("drain lock error: {0}")]
    Lock(std::io::Error),
}

/// Result type for sync engine operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Behavioural options for the engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Where the caller is sent when the credential is rejected.
    pub login_url: String,
    /// JSON pointer to the server-assigned id in create responses.
    pub id_pointer: String,
    /// Queue live writes behind pending ones instead of letting them overtake.
    pub preserve_order: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            login_url: "/login".to_string(),
            id_pointer: "/id".to_string(),
            preserve_order: true,
        }
    }
}

/// Offline queue, connectivity check and replayer in one injectable service.
pub struct SyncEngine<B: Backend> {
    pub(super) backend: B,
    pub(super) store: QueueStore,
    pub(super) connectivity: Arc<dyn Connectivity>,
    pub(super) trigger: Arc<dyn SyncTrigger>,
    pub(super) credentials: Arc<dyn CredentialStore>,
    pub(super) options: EngineOptions,
    pub(super) drain_lock: Option<DrainLock>,
    /// Set while a drain is running.
    pub(super) draining: AtomicBool,
}

impl<B: Backend> SyncEngine<B> {
    /// Create an engine with an optimistic connectivity flag and no trigger.
    pub fn new(backend: B, store: QueueStore, credentials: Arc<dyn CredentialStore>) -> Self {
        SyncEngine {
            backend,
            store,
            connectivity: Arc::new(ConnectivityFlag::new()),
            trigger: Arc::new(NoopTrigger),
            credentials,
            options: EngineOptions::default(),
            drain_lock: None,
            draining: AtomicBool::new(false),
        }
    }

    /// Use a host-provided connectivity oracle.
    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Use a host-provided sync trigger.
    pub fn with_trigger(mut self, trigger: Arc<dyn SyncTrigger>) -> Self {
        self.trigger = trigger;
        self
    }

    /// Coordinate drains with other processes through a lock file.
    pub fn with_drain_lock(mut self, lock: DrainLock) -> Self {
        self.drain_lock = Some(lock);
        self
    }

    /// Override the default options.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying queue store.
    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    /// True if a bearer token is stored.
    pub fn has_credential(&self) -> bool {
        self.credentials.token().is_some()
    }

    /// Current connectivity according to the oracle.
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Number of mutations waiting to be replayed.
    pub fn pending_count(&self) -> SyncResult<usize> {
        Ok(self.store.len()?)
    }

    /// Forget the stored credential after the server rejected it.
    pub(super) fn clear_credentials(&self) {
        if let Err(e) = self.credentials.clear() {
            tracing::warn!("failed to clear credential: {}", e);
        }
    }

    /// Clear the credential and build the error that sends the caller to login.
    pub(super) fn unauthorized(&self) -> SyncError {
        self.clear_credentials();
        SyncError::Unauthorized {
            login_url: self.options.login_url.clone(),
        }
    }
}
