// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Backend abstraction for the survey REST API.
//!
//! Provides a trait-based boundary that enables:
//! - Real HTTP calls for production
//! - Mock backends for unit testing
//!
//! The only distinction the sync layer needs is whether the API was reached
//! ([`CallError::Network`]) or gave a final answer ([`CallError::Application`],
//! [`CallError::Unauthorized`]). Timeouts, rate limits and gateway errors
//! count as not reached: the same request may well succeed later.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use svq_core::Method;

use crate::config::BackendConfig;

/// A single API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>, body: Option<Value>) -> Self {
        ApiRequest {
            method,
            endpoint: endpoint.into(),
            body,
            token: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// Error type for backend calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    /// No usable response: offline, DNS failure, refused connection, timeout,
    /// or a status saying the API is temporarily unavailable.
    #[error("network error: {0}")]
    Network(String),

    /// The credential was rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The server responded with an error status.
    #[error("server returned {status}: {message}")]
    Application { status: u16, message: String },
}

/// Result type for backend calls.
pub type CallResult = Result<Value, CallError>;

/// Backend trait for REST-like communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Backend: Send + Sync {
    /// Perform one call and return the decoded JSON body.
    fn call(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = CallResult> + Send + '_>>;
}

/// HTTP backend using a blocking `ureq` agent on the tokio blocking pool.
pub struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Create a backend for the configured base URL.
    pub fn new(config: &BackendConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(Duration::from_millis(config.request_timeout_ms))
            .timeout_write(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("svsync/", env!("CARGO_PKG_VERSION")))
            .build();
        HttpBackend {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Join the base URL and an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

impl Backend for HttpBackend {
    fn call(&self, request: ApiRequest) -> Pin<Box<dyn Future<Output = CallResult> + Send + '_>> {
        let agent = self.agent.clone();
        let url = self.url(&request.endpoint);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || send_blocking(&agent, &url, request))
                .await
                .map_err(|e| CallError::Network(format!("request task failed: {}", e)))?
        })
    }
}

fn send_blocking(agent: &ureq::Agent, url: &str, request: ApiRequest) -> CallResult {
    let mut req = agent
        .request(request.method.http_verb(), url)
        .set("accept", "application/json");
    if let Some(token) = request.token.as_ref() {
        req = req.set("authorization", &format!("Bearer {}", token));
    }

    let result = match request.body {
        Some(body) if request.method.is_write() && !body.is_null() => req.send_json(body),
        _ => req.call(),
    };

    match result {
        Ok(resp) => {
            let text = resp
                .into_string()
                .map_err(|e| CallError::Network(format!("reading response failed: {}", e)))?;
            Ok(decode_body(&text))
        }
        Err(ureq::Error::Status(status, resp)) => {
            let text = resp.into_string().unwrap_or_default();
            Err(status_error(status, &text))
        }
        Err(ureq::Error::Transport(err)) => Err(CallError::Network(err.to_string())),
    }
}

/// Statuses meaning the API is temporarily out of reach.
const UNAVAILABLE_STATUSES: [u16; 5] = [408, 429, 502, 503, 504];

/// Classify an error response.
pub(crate) fn status_error(status: u16, body: &str) -> CallError {
    match status {
        401 => CallError::Unauthorized,
        s if UNAVAILABLE_STATUSES.contains(&s) => CallError::Network(format!(
            "server unavailable ({}): {}",
            status,
            error_message(body)
        )),
        _ => CallError::Application {
            status,
            message: error_message(body),
        },
    }
}

/// Decode a success body. Empty bodies become `null`; non-JSON stays text.
pub(crate) fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Pick a human-readable message out of an error body.
pub(crate) fn error_message(text: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(text).ok();
    let message = parsed.as_ref().and_then(|v| {
        ["/message", "/error", "/detail", "/error/message"]
            .iter()
            .find_map(|p| v.pointer(p).and_then(Value::as_str))
    });
    match message {
        Some(m) => m.to_string(),
        None if text.trim().is_empty() => "no response body".to_string(),
        None => text.trim().to_string(),
    }
}
