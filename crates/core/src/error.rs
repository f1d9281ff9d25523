// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for svq-core operations.

use thiserror::Error;

use crate::mutation::MutationId;

/// All possible errors that can occur in svq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid method: '{0}'\n  hint: valid methods are: get, create, update, patch, delete")]
    InvalidMethod(String),

    #[error("invalid mutation status: '{0}'")]
    InvalidStatus(String),

    #[error("{0} is a read and cannot be queued\n  hint: only create, update, patch and delete are deferred")]
    NotAMutation(String),

    #[error("endpoint cannot be empty")]
    EmptyEndpoint,

    #[error("offline queue is full ({capacity} pending mutations)\n  hint: reconnect and run 'svsync drain' before making more changes")]
    QueueFull { capacity: usize },

    #[error("mutation not found: {0}")]
    MutationNotFound(MutationId),

    #[error("queue store lock poisoned")]
    LockPoisoned,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for svq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
