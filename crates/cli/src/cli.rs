// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use svq_core::Method;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Parse a queue capacity of at least one.
fn positive_capacity(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Write operations accepted by `send`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WriteMethod {
    Create,
    Update,
    Patch,
    Delete,
}

impl From<WriteMethod> for Method {
    fn from(m: WriteMethod) -> Self {
        match m {
            WriteMethod::Create => Method::Create,
            WriteMethod::Update => Method::Update,
            WriteMethod::Patch => Method::Patch,
            WriteMethod::Delete => Method::Delete,
        }
    }
}

#[derive(Parser)]
#[command(name = "svsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline write queue and sync client for the survey API")]
#[command(
    long_about = "Offline write queue and sync client for the survey API.\n\n\
    Writes made while the API is unreachable are stored locally and replayed \
    in order once the connection returns."
)]
pub struct Cli {
    /// Treat the network as unavailable and queue every write
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize the client configuration
    #[command(after_help = "\
Examples:
  svsync init --url https://api.example.com/v1
  svsync init --url http://localhost:8080 --capacity 200")]
    Init {
        /// Base URL of the survey API
        #[arg(long, value_parser = non_empty_string)]
        url: String,

        /// Where to send the user when the credential is rejected
        #[arg(long)]
        login_url: Option<String>,

        /// Maximum number of queued writes
        #[arg(long, value_parser = positive_capacity)]
        capacity: Option<usize>,
    },

    /// Store the bearer token used for API calls
    Login {
        #[arg(value_parser = non_empty_string)]
        token: String,
    },

    /// Forget the stored bearer token
    Logout,

    /// Read from the API (never queued)
    Get {
        #[arg(value_parser = non_empty_string)]
        endpoint: String,
    },

    /// Send a write, queueing it if the API is unreachable
    #[command(after_help = "\
Examples:
  svsync send create /roles --data '{\"name\":\"admin\"}'
  svsync send patch /campaigns/local-3 --data '{\"status\":\"active\"}'
  svsync send delete /payment-methods/9")]
    Send {
        method: WriteMethod,

        #[arg(value_parser = non_empty_string)]
        endpoint: String,

        /// JSON payload
        #[arg(long, short)]
        data: Option<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Inspect the offline queue
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Show connectivity, credential and queue state
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Replay queued writes now
    Drain {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Keep replaying queued writes as connectivity allows
    Watch,

    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List queued writes in replay order
    List {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List writes the server rejected during replay
    Failed {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Delete the rejected-write log
    PurgeFailed,
}
