// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity oracle.
//!
//! [`ConnectivityFlag`] holds the best-known network state with atomic
//! fields, so checks never block. Until the host reports anything the state is
//! unknown, which counts as online: the real call is attempted and a network
//! failure is what diverts the write into the queue.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// State values for the atomic state field.
pub const STATE_UNKNOWN: u8 = 0;
pub const STATE_ONLINE: u8 = 1;
pub const STATE_OFFLINE: u8 = 2;

/// Source of the current online/offline state.
pub trait Connectivity: Send + Sync {
    /// Returns the current best-known connectivity. Must not block.
    fn is_online(&self) -> bool;
}

/// Host-driven connectivity state with change notifications.
pub struct ConnectivityFlag {
    state: AtomicU8,
    changes: watch::Sender<bool>,
}

impl ConnectivityFlag {
    /// Create a flag in the unknown (optimistically online) state.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(true);
        ConnectivityFlag {
            state: AtomicU8::new(STATE_UNKNOWN),
            changes,
        }
    }

    /// Create a flag with a known state.
    pub fn with_state(online: bool) -> Self {
        let flag = Self::new();
        flag.set_online(online);
        flag
    }

    /// Get the raw state value.
    pub fn get(&self) -> u8 {
        self.state.load(Ordering::Acquire)
    }

    /// Record the host's network signal. Returns true if the state changed.
    pub fn set_online(&self, online: bool) -> bool {
        let next = if online { STATE_ONLINE } else { STATE_OFFLINE };
        let prev = self.state.swap(next, Ordering::AcqRel);
        if prev == next {
            return false;
        }
        self.changes.send_replace(online);
        true
    }

    /// Subscribe to online/offline transitions.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.changes.subscribe()
    }

    /// Human-readable state.
    pub fn status_str(&self) -> &'static str {
        match self.get() {
            STATE_ONLINE => "online",
            STATE_OFFLINE => "offline",
            _ => "unknown",
        }
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        self.get() != STATE_OFFLINE
    }
}

/// Derive a `host:port` probe target from an http(s) base URL.
pub fn probe_target(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{host}:{port}"))
}

/// Try a TCP connection to the target within the timeout.
pub async fn probe(target: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(target)).await,
        Ok(Ok(_))
    )
}

/// Periodically probe the backend and feed the result into the flag.
pub fn spawn_probe(
    flag: Arc<ConnectivityFlag>,
    target: String,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let online = probe(&target, timeout).await;
            if flag.set_online(online) {
                tracing::info!("connectivity changed: {} ({})", flag.status_str(), target);
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    })
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
