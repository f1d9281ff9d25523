// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `get` and `send`: API calls routed through the sync engine.

use serde_json::{json, Value};
use svq_core::Method;

use crate::cli::{OutputFormat, WriteMethod};
use crate::commands::{open_session, runtime, Session};
use crate::error::{Error, Result};
use crate::sync::PerformOutcome;

pub fn get(endpoint: &str, offline: bool) -> Result<()> {
    let session = open_session(offline)?;
    let value = runtime()?.block_on(session.engine.get(endpoint))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

pub fn send(
    method: WriteMethod,
    endpoint: &str,
    data: Option<&str>,
    offline: bool,
    output: OutputFormat,
) -> Result<()> {
    let payload = parse_payload(data)?;
    let session = open_session(offline)?;
    let outcome = runtime()?.block_on(send_impl(&session, method.into(), endpoint, payload))?;
    print!("{}", render(&outcome, output)?);
    Ok(())
}

pub(crate) async fn send_impl(
    session: &Session,
    method: Method,
    endpoint: &str,
    payload: Value,
) -> Result<PerformOutcome> {
    Ok(session.engine.perform(method, endpoint, payload).await?)
}

/// Parse `--data`; a missing payload is `null`.
pub(crate) fn parse_payload(data: Option<&str>) -> Result<Value> {
    match data {
        None => Ok(Value::Null),
        Some(raw) => serde_json::from_str(raw).map_err(|e| Error::InvalidPayload(e.to_string())),
    }
}

pub(crate) fn render(outcome: &PerformOutcome, output: OutputFormat) -> Result<String> {
    let rendered = match (outcome, output) {
        (PerformOutcome::Applied(response), OutputFormat::Json) => {
            serde_json::to_string_pretty(&json!({ "status": "applied", "response": response }))?
        }
        (PerformOutcome::Applied(response), OutputFormat::Text) => {
            serde_json::to_string_pretty(response)?
        }
        (PerformOutcome::Queued(pending), OutputFormat::Json) => {
            serde_json::to_string_pretty(&json!({ "status": "queued", "pending": pending }))?
        }
        (PerformOutcome::Queued(pending), OutputFormat::Text) => {
            let mut text = format!(
                "Queued as mutation #{}; it will be sent when the API is reachable",
                pending.mutation_id
            );
            if let Some(placeholder) = &pending.placeholder_id {
                text.push_str(&format!("\nTemporary id: {}", placeholder));
            }
            text
        }
    };
    Ok(format!("{rendered}\n"))
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
