// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use svq_core::MutationStatus;

use crate::cli::OutputFormat;
use crate::commands::{open_session, runtime, Session};
use crate::config::lock_path;
use crate::error::Result;
use crate::sync::{probe, probe_target, CredentialStore, DrainLock};

/// Snapshot of the client state.
#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub api: String,
    pub connectivity: &'static str,
    pub logged_in: bool,
    pub pending: usize,
    /// Pending writes whose last replay attempt found no server.
    pub retrying: usize,
    pub rejected: usize,
    pub capacity: usize,
    pub draining: bool,
}

pub fn run(offline: bool, output: OutputFormat) -> Result<()> {
    let session = open_session(offline)?;
    if session.engine.is_online() {
        if let Some(target) = probe_target(&session.config.backend.base_url) {
            let timeout = session.config.backend.connect_timeout();
            let reachable = runtime()?.block_on(probe(&target, timeout));
            session.connectivity.set_online(reachable);
        }
    }

    let report = collect(&session)?;
    print!("{}", render(&report, output)?);
    Ok(())
}

pub(crate) fn collect(session: &Session) -> Result<StatusReport> {
    let store = session.engine.store();
    let pending = store.peek_all()?;
    let draining = DrainLock::new(lock_path(&session.home)).is_held()?;

    Ok(StatusReport {
        api: session.config.backend.base_url.clone(),
        connectivity: session.connectivity.status_str(),
        logged_in: session.credentials.token().is_some(),
        pending: pending.len(),
        retrying: pending
            .iter()
            .filter(|m| m.status == MutationStatus::Failed)
            .count(),
        rejected: store.dead_letters()?.len(),
        capacity: store.capacity(),
        draining,
    })
}

pub(crate) fn render(report: &StatusReport, output: OutputFormat) -> Result<String> {
    if output == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(report)?));
    }

    let mut out = String::new();
    out.push_str(&format!("API: {} ({})\n", report.api, report.connectivity));
    out.push_str(&format!(
        "Credential: {}\n",
        if report.logged_in { "stored" } else { "none (run 'svsync login')" }
    ));
    out.push_str(&format!("Queued: {}/{}", report.pending, report.capacity));
    if report.retrying > 0 {
        out.push_str(&format!(" ({} waiting to retry)", report.retrying));
    }
    out.push('\n');
    if report.rejected > 0 {
        out.push_str(&format!(
            "Rejected: {} (see 'svsync queue failed')\n",
            report.rejected
        ));
    }
    if report.draining {
        out.push_str("Another svsync process is replaying the queue\n");
    }
    Ok(out)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
