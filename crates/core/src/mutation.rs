// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred writes against the backend API.
//!
//! Every state-changing call that cannot reach the server is captured as a
//! [`QueuedMutation`]. Mutations are identified by a store-assigned
//! [`MutationId`] that grows monotonically and is never reused, so replay
//! order is simply ascending id order.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Unique identifier for a queued mutation.
pub type MutationId = i64;

/// Prefix of the optimistic identifiers handed out for queued creates.
pub const PLACEHOLDER_PREFIX: &str = "local-";

/// Logical API method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Create,
    Update,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Create => "CREATE",
            Method::Update => "UPDATE",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// The HTTP verb this method is sent as.
    pub fn http_verb(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Create => "POST",
            Method::Update => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Returns true for state-changing methods.
    pub fn is_write(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Accepts both logical names and HTTP verbs.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "create" | "post" => Ok(Method::Create),
            "update" | "put" => Ok(Method::Update),
            "patch" => Ok(Method::Patch),
            "delete" => Ok(Method::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// Replay bookkeeping for a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    /// Waiting to be replayed.
    Pending,
    /// Currently being sent by a drain.
    InFlight,
    /// The last replay attempt could not reach the server.
    Failed,
}

impl MutationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::Pending => "pending",
            MutationStatus::InFlight => "in_flight",
            MutationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MutationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(MutationStatus::Pending),
            "in_flight" => Ok(MutationStatus::InFlight),
            "failed" => Ok(MutationStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A validated write that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub endpoint: String,
    pub method: Method,
    pub payload: Value,
}

impl MutationRequest {
    /// Creates a request for a state-changing call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAMutation`] for reads and [`Error::EmptyEndpoint`]
    /// when the endpoint is blank.
    pub fn new(method: Method, endpoint: impl Into<String>, payload: Value) -> Result<Self> {
        let endpoint = endpoint.into();
        if !method.is_write() {
            return Err(Error::NotAMutation(method.to_string()));
        }
        if endpoint.trim().is_empty() {
            return Err(Error::EmptyEndpoint);
        }
        Ok(MutationRequest {
            endpoint,
            method,
            payload,
        })
    }
}

/// A write waiting in the offline queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMutation {
    pub id: MutationId,
    pub endpoint: String,
    pub method: Method,
    pub payload: Value,
    /// Informational only; replay order is by `id`.
    pub enqueued_at: DateTime<Utc>,
    pub status: MutationStatus,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueuedMutation {
    /// The optimistic id given to the caller, for creates only.
    pub fn placeholder_id(&self) -> Option<String> {
        match self.method {
            Method::Create => Some(placeholder_id(self.id)),
            _ => None,
        }
    }
}

/// Builds the optimistic identifier for a queued create.
pub fn placeholder_id(id: MutationId) -> String {
    format!("{PLACEHOLDER_PREFIX}{id}")
}

/// Returns true if `value` looks like an optimistic identifier.
pub fn is_placeholder(value: &str) -> bool {
    value
        .strip_prefix(PLACEHOLDER_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Synthesizes the result returned to a caller whose write was queued.
///
/// Object payloads are echoed with `_pending` and `_mutation_id` markers, and
/// creates get their placeholder `id`. Anything else is wrapped under `data`.
pub fn optimistic_body(mutation: &QueuedMutation) -> Value {
    let mut body = match &mutation.payload {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other.clone());
            map
        }
    };
    if let Some(placeholder) = mutation.placeholder_id() {
        body.insert("id".to_string(), Value::String(placeholder));
    }
    body.insert("_pending".to_string(), Value::Bool(true));
    body.insert("_mutation_id".to_string(), Value::from(mutation.id));
    Value::Object(body)
}

/// A mutation that was removed from the queue because it can never succeed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub id: MutationId,
    pub endpoint: String,
    pub method: Method,
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
    /// HTTP status returned by the server, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub reason: String,
    pub discarded_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
