// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline write queue and sync reconciliation.
//!
//! Sits between the application and the survey REST API so that writes made
//! without a connection are kept and replayed later, in order.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  perform()   │────►│   Backend   │────►│  REST API   │
//! │(interceptor) │     │   (trait)   │◄────│             │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!        │ offline / no response  ▲
//!        ▼                        │ drain()
//! ┌──────────────┐     ┌──────────┴──┐
//! │  QueueStore  │────►│  Replayer   │◄──── SyncTrigger / worker
//! │   (SQLite)   │     │             │
//! └──────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Connectivity oracle with optimistic default and TCP probing
//! - Durable FIFO queue with a bounded capacity that fails loudly when full
//! - Optimistic results with placeholder ids for queued creates
//! - Placeholder ids resolved to server ids during replay
//! - Dead-letter log for mutations the server rejects
//! - Background worker with exponential backoff
//! - Cross-process drain lock so a queue file is replayed by one process at a time
//! - Injectable backend trait for testing

mod backend;
mod connectivity;
mod credentials;
mod engine;
mod interceptor;
mod lock;
mod replayer;
mod trigger;
mod worker;

pub use backend::{ApiRequest, Backend, CallError, CallResult, HttpBackend};
pub use connectivity::{probe, probe_target, spawn_probe, Connectivity, ConnectivityFlag};
pub use credentials::{CredentialStore, FileCredentials, MemoryCredentials};
pub use engine::{EngineOptions, SyncEngine, SyncError, SyncResult};
pub use interceptor::{PendingWrite, PerformOutcome};
pub use lock::DrainLock;
pub use replayer::{Discarded, DrainReport, HaltReason};
pub use trigger::{NoopTrigger, NotifyTrigger, SyncTrigger};
pub use worker::{run_worker, Backoff, WorkerConfig};

#[cfg(test)]
mod test_helpers;


#[cfg(test)]
mod interceptor_tests;
