// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use svq_core::QueueStore;

use crate::config::{home_dir, init_home, queue_path, Config};
use crate::error::Result;

pub fn run(url: &str, login_url: Option<String>, capacity: Option<usize>) -> Result<()> {
    let home = home_dir()?;
    run_impl(&home, url, login_url, capacity)?;

    println!("Initialized svsync at {}", home.display());
    println!();
    println!("Next: svsync login <TOKEN>");
    Ok(())
}

pub(crate) fn run_impl(
    home: &Path,
    url: &str,
    login_url: Option<String>,
    capacity: Option<usize>,
) -> Result<Config> {
    let mut config = Config::new(url)?;
    if let Some(login_url) = login_url {
        config.backend.login_url = login_url;
    }
    if let Some(capacity) = capacity {
        config.queue.capacity = capacity;
    }

    init_home(home, &config)?;
    // Create the queue up front so a bad home fails here, not on first write
    QueueStore::open(&queue_path(home), config.queue.capacity)?;

    Ok(config)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
