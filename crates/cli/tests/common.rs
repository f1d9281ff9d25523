// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so every call fails without a response.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// `svsync` with its home pointed at `temp` and a clean environment.
pub fn svsync(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("svsync");
    cmd.env("SVSYNC_HOME", temp.path())
        .env_remove("SVSYNC_OFFLINE")
        .env_remove("SVSYNC_LOG");
    cmd
}

/// Helper to create an initialized home pointing at an unreachable API.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    svsync(&temp)
        .args(["init", "--url", UNREACHABLE_URL])
        .assert()
        .success();
    temp
}

/// Helper to queue a write and return its mutation id.
pub fn queue_write(temp: &TempDir, method: &str, endpoint: &str, data: &str) -> i64 {
    let output = svsync(temp)
        .args(["--offline", "send", method, endpoint, "--data", data, "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    value["pending"]["mutation_id"].as_i64().unwrap()
}
