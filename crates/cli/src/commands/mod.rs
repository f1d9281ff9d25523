// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod auth;
pub mod drain;
pub mod init;
pub mod queue;
pub mod send;
pub mod status;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use svq_core::QueueStore;

use crate::config::{credentials_path, find_home, lock_path, queue_path, Config};
use crate::error::{Error, Result};
use crate::sync::{
    ConnectivityFlag, DrainLock, FileCredentials, HttpBackend, SyncEngine, SyncTrigger,
};

/// Everything a command needs to talk to the queue and the API.
pub struct Session {
    pub home: PathBuf,
    pub config: Config,
    pub engine: Arc<SyncEngine<HttpBackend>>,
    pub connectivity: Arc<ConnectivityFlag>,
    pub credentials: Arc<FileCredentials>,
}

/// Helper to open the engine from the current context.
///
/// With `offline` the connectivity flag starts offline, otherwise it starts
/// unknown (treated as online until a call or probe says otherwise).
pub fn open_session(offline: bool) -> Result<Session> {
    let home = find_home()?;
    let config = Config::load(&home)?;
    open_session_at(home, config, offline, None)
}

/// Same as [`open_session`] for a known home, optionally wiring a trigger.
pub fn open_session_at(
    home: PathBuf,
    config: Config,
    offline: bool,
    trigger: Option<Arc<dyn SyncTrigger>>,
) -> Result<Session> {
    let store = QueueStore::open(&queue_path(&home), config.queue.capacity)?;
    let backend = HttpBackend::new(&config.backend);
    let credentials = Arc::new(FileCredentials::new(&credentials_path(&home)));
    let connectivity = Arc::new(if offline {
        ConnectivityFlag::with_state(false)
    } else {
        ConnectivityFlag::new()
    });

    let mut engine = SyncEngine::new(backend, store, credentials.clone())
        .with_connectivity(connectivity.clone())
        .with_drain_lock(DrainLock::new(lock_path(&home)))
        .with_options(config.engine_options());
    if let Some(trigger) = trigger {
        engine = engine.with_trigger(trigger);
    }

    Ok(Session {
        home,
        config,
        engine: Arc::new(engine),
        connectivity,
        credentials,
    })
}

/// Build the runtime used by a single command.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
