// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::commands::{open_session, runtime};
use crate::config::lock_path;
use crate::error::{Error, Result};
use crate::sync::{DrainReport, HaltReason};

pub fn run(offline: bool, output: OutputFormat) -> Result<()> {
    let session = open_session(offline)?;

    if !session.engine.is_online() {
        println!("Offline: {} write(s) left queued", session.engine.pending_count()?);
        return Ok(());
    }

    let report = runtime()?.block_on(session.engine.drain())?;
    if report.skipped {
        return Err(Error::LockHeld(lock_path(&session.home).display().to_string()));
    }
    print!("{}", render(&report, &session.engine.options().login_url, output)?);
    Ok(())
}

pub(crate) fn render(report: &DrainReport, login_url: &str, output: OutputFormat) -> Result<String> {
    if output == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(report)?));
    }

    let mut out = format!("Replayed {} write(s)\n", report.applied.len());
    for d in &report.discarded {
        out.push_str(&format!(
            "Rejected #{} ({}): {}\n",
            d.id, d.status, d.message
        ));
    }
    match &report.halted {
        Some(HaltReason::Network(msg)) => {
            out.push_str(&format!("Stopped: API unreachable ({})\n", msg));
        }
        Some(HaltReason::Unauthorized) => {
            out.push_str(&format!(
                "Stopped: credential rejected\n  hint: log in again at {}\n",
                login_url
            ));
        }
        None => {}
    }
    if report.remaining > 0 {
        out.push_str(&format!("{} write(s) still queued\n", report.remaining));
    }
    if !report.discarded.is_empty() {
        out.push_str("See 'svsync queue failed' for rejected writes\n");
    }
    Ok(out)
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
