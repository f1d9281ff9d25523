// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground sync loop.
//!
//! Probes the API for reachability, replays queued writes whenever it is
//! reachable, and exits on Ctrl-C. Each drain takes the drain lock, so
//! `drain` or `send` in another process never replays the same write.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::commands::{open_session_at, runtime, Session};
use crate::config::{find_home, Config};
use crate::error::Result;
use crate::sync::{probe_target, run_worker, spawn_probe, NotifyTrigger};

pub fn run(offline: bool) -> Result<()> {
    let home = find_home()?;
    let config = Config::load(&home)?;
    let trigger = Arc::new(NotifyTrigger::new());
    let session = open_session_at(home, config, offline, Some(trigger.clone()))?;

    let probe = session.engine.is_online();
    if !probe {
        println!("Offline mode: writes stay queued until restarted without --offline");
    }
    println!(
        "Watching {} ({} queued), press Ctrl-C to stop",
        session.config.backend.base_url,
        session.engine.pending_count()?
    );

    runtime()?.block_on(async {
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, shutting down");
            }
            shutdown.cancel();
        });
        watch_until(&session, trigger, probe, cancel).await;
    });
    Ok(())
}

/// Run the probe and worker until `cancel` fires.
pub(crate) async fn watch_until(
    session: &Session,
    trigger: Arc<NotifyTrigger>,
    probe: bool,
    cancel: CancellationToken,
) {
    let prober = match probe_target(&session.config.backend.base_url) {
        Some(target) if probe => Some(spawn_probe(
            session.connectivity.clone(),
            target,
            session.config.sync.probe_interval(),
            session.config.backend.connect_timeout(),
            cancel.clone(),
        )),
        _ => None,
    };

    let worker = tokio::spawn(run_worker(
        session.engine.clone(),
        trigger,
        session.connectivity.subscribe(),
        session.config.sync.worker_config(),
        cancel.clone(),
    ));

    cancel.cancelled().await;
    if let Err(e) = worker.await {
        tracing::warn!("sync worker ended abnormally: {}", e);
    }
    if let Some(prober) = prober {
        if let Err(e) = prober.await {
            tracing::warn!("connectivity probe ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
