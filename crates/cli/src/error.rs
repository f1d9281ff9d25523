// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::SyncError;

/// All possible errors that can occur in the svsync client.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'svsync init --url <URL>' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("invalid URL '{0}'\n  hint: use an http:// or https:// URL with a host")]
    InvalidUrl(String),

    #[error("invalid payload: {0}\n  hint: --data expects a JSON document, e.g. '{{\"name\":\"admin\"}}'")]
    InvalidPayload(String),

    #[error("another svsync process is draining the queue\n  hint: lock held on {0}")]
    LockHeld(String),

    #[error("queue error: {0}")]
    Store(#[from] svq_core::Error),

    #[error(transparent)]
    Sync(SyncError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for svsync operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<SyncError> for Error {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Store(e) => Error::Store(e),
            SyncError::Credentials(e) | SyncError::Lock(e) => Error::Io(e),
            other => Error::Sync(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
