// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue inspection commands.

use svq_core::{DeadLetter, QueuedMutation};

use crate::cli::OutputFormat;
use crate::commands::open_session;
use crate::error::Result;

pub fn list(output: OutputFormat) -> Result<()> {
    let session = open_session(false)?;
    let pending = session.engine.store().peek_all()?;
    print!("{}", render_pending(&pending, output)?);
    Ok(())
}

pub fn failed(output: OutputFormat) -> Result<()> {
    let session = open_session(false)?;
    let dead = session.engine.store().dead_letters()?;
    print!("{}", render_dead_letters(&dead, output)?);
    Ok(())
}

pub fn purge_failed() -> Result<()> {
    let session = open_session(false)?;
    let removed = session.engine.store().clear_dead_letters()?;
    println!("Removed {} rejected write(s)", removed);
    Ok(())
}

pub(crate) fn render_pending(pending: &[QueuedMutation], output: OutputFormat) -> Result<String> {
    if output == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(pending)?));
    }
    if pending.is_empty() {
        return Ok("Queue is empty\n".to_string());
    }

    let mut out = String::new();
    for m in pending {
        out.push_str(&format!(
            "#{:<5} {:<7} {:<40} {:<9} {}",
            m.id,
            m.method.as_str(),
            m.endpoint,
            m.status.as_str(),
            m.enqueued_at.format("%Y-%m-%d %H:%M:%S")
        ));
        if m.attempts > 0 {
            out.push_str(&format!("  attempts: {}", m.attempts));
        }
        if let Some(err) = &m.last_error {
            out.push_str(&format!("  last error: {}", err));
        }
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn render_dead_letters(dead: &[DeadLetter], output: OutputFormat) -> Result<String> {
    if output == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(dead)?));
    }
    if dead.is_empty() {
        return Ok("No rejected writes\n".to_string());
    }

    let mut out = String::new();
    for d in dead {
        let status = d
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "#{:<5} {:<7} {:<40} {:<4} {}  {}\n",
            d.id,
            d.method.as_str(),
            d.endpoint,
            status,
            d.discarded_at.format("%Y-%m-%d %H:%M:%S"),
            d.reason
        ));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
