// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored in `config.toml` inside the svsync home
//! (`$SVSYNC_HOME`, or `svsync/` under the platform config directory):
//! - `[backend]`: where the survey API lives and how long to wait for it
//! - `[queue]`: capacity and replay behaviour of the offline queue
//! - `[sync]`: timing of the background worker and connectivity probe
//!
//! The home also holds the queue database, the stored credential and the
//! drain lock.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use svq_core::DEFAULT_CAPACITY;
use url::Url;

use crate::error::{Error, Result};
use crate::sync::{EngineOptions, WorkerConfig};

const HOME_DIR_NAME: &str = "svsync";
const CONFIG_FILE_NAME: &str = "config.toml";
const QUEUE_FILE_NAME: &str = "queue.db";
const CREDENTIALS_FILE_NAME: &str = "credentials";
const LOCK_FILE_NAME: &str = "drain.lock";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// REST backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the API, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Where to send the user when the credential is rejected.
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Offline queue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of queued mutations (default: 1000).
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// JSON pointer to the server id in create responses (default: `/id`).
    #[serde(default = "default_id_pointer")]
    pub id_pointer: String,
    /// Flush queued writes before a live write goes out (default: true).
    #[serde(default = "default_preserve_order")]
    pub preserve_order: bool,
}

/// Background worker timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// How often `watch` probes the backend for reachability.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

fn default_login_url() -> String {
    "/login".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_id_pointer() -> String {
    "/id".to_string()
}

fn default_preserve_order() -> bool {
    true
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_secs() -> u64 {
    60
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_probe_interval_secs() -> u64 {
    5
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            capacity: default_capacity(),
            id_pointer: default_id_pointer(),
            preserve_order: default_preserve_order(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl SyncConfig {
    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_secs(self.max_delay_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }
}

impl Config {
    /// Creates a config for the given API base URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] unless the URL is `http://` or `https://`
    /// with a host.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = validate_url(base_url)?;
        Ok(Config {
            backend: BackendConfig {
                base_url,
                login_url: default_login_url(),
                connect_timeout_ms: default_connect_timeout_ms(),
                request_timeout_ms: default_request_timeout_ms(),
            },
            queue: QueueConfig::default(),
            sync: SyncConfig::default(),
        })
    }

    /// Loads configuration from the given home directory.
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        validate_url(&config.backend.base_url)?;
        if config.queue.capacity == 0 {
            return Err(Error::Config("queue.capacity must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Saves configuration to the given home directory.
    pub fn save(&self, home: &Path) -> Result<()> {
        let config_path = home.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Engine options derived from this configuration.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            login_url: self.backend.login_url.clone(),
            id_pointer: self.queue.id_pointer.clone(),
            preserve_order: self.queue.preserve_order,
        }
    }
}

/// Trim a trailing slash and check the scheme and host.
fn validate_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|_| Error::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::InvalidUrl(url.to_string()));
    }
    Ok(trimmed.to_string())
}

/// The svsync home: `$SVSYNC_HOME`, else `svsync/` under the config directory.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(home) = crate::env::home() {
        return Ok(home);
    }
    dirs::config_dir()
        .map(|d| d.join(HOME_DIR_NAME))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
}

/// Find an initialized home directory.
pub fn find_home() -> Result<PathBuf> {
    let home = home_dir()?;
    if home.join(CONFIG_FILE_NAME).is_file() {
        Ok(home)
    } else {
        Err(Error::NotInitialized)
    }
}

/// Initialize the home directory with a fresh config.
pub fn init_home(home: &Path, config: &Config) -> Result<()> {
    if home.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(home.display().to_string()));
    }
    fs::create_dir_all(home)?;
    config.save(home)
}

/// Path of the queue database.
pub fn queue_path(home: &Path) -> PathBuf {
    home.join(QUEUE_FILE_NAME)
}

/// Path of the stored credential.
pub fn credentials_path(home: &Path) -> PathBuf {
    home.join(CREDENTIALS_FILE_NAME)
}

/// Path of the lock file held while draining.
pub fn lock_path(home: &Path) -> PathBuf {
    home.join(LOCK_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
