// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! svsync - offline write queue and sync client for the survey API.
//!
//! This crate provides the `svsync` CLI and the sync engine behind it.
//! Writes that cannot reach the API are stored in a local SQLite queue
//! (see `svq-core`) and replayed in order once the API is reachable.
//!
//! # Main Components
//!
//! - [`sync::SyncEngine`] - intercepts writes, queues them offline, drains the queue
//! - [`sync::Backend`] - the HTTP boundary, with [`sync::HttpBackend`] for real calls
//! - [`Config`] - API location, queue capacity and sync timing
//! - [`Error`] - Error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use svsync::sync::{FileCredentials, HttpBackend, SyncEngine};
//! use svq_core::{Method, QueueStore};
//!
//! let store = QueueStore::open(&queue_path, 1000)?;
//! let engine = SyncEngine::new(HttpBackend::new(&config.backend), store, Arc::new(creds));
//! let outcome = engine.perform(Method::Create, "/roles", payload).await?;
//! ```

mod cli;
mod commands;
mod env;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat, QueueCommand, WriteMethod};
pub use config::{find_home, init_home, Config};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Returns the log filter for a command: `SVSYNC_LOG` if set, otherwise
/// `info` for long-running commands and `warn` for the rest.
pub fn log_filter(command: &Command) -> String {
    env::log_filter().unwrap_or_else(|| match command {
        Command::Watch => "info".to_string(),
        _ => "warn".to_string(),
    })
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let offline = cli.offline || env::offline();
    match cli.command {
        Command::Init {
            url,
            login_url,
            capacity,
        } => commands::init::run(&url, login_url, capacity),
        Command::Login { token } => commands::auth::login(&token),
        Command::Logout => commands::auth::logout(),
        Command::Get { endpoint } => commands::send::get(&endpoint, offline),
        Command::Send {
            method,
            endpoint,
            data,
            output,
        } => commands::send::send(method, &endpoint, data.as_deref(), offline, output),
        Command::Queue(cmd) => match cmd {
            QueueCommand::List { output } => commands::queue::list(output),
            QueueCommand::Failed { output } => commands::queue::failed(output),
            QueueCommand::PurgeFailed => commands::queue::purge_failed(),
        },
        Command::Status { output } => commands::status::run(offline, output),
        Command::Drain { output } => commands::drain::run(offline, output),
        Command::Watch => commands::watch::run(offline),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "svsync", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
