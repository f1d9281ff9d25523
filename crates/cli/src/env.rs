// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `SVSYNC_HOME` if set.
pub fn home() -> Option<PathBuf> {
    std::env::var(vars::SVSYNC_HOME)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Returns `true` if `SVSYNC_OFFLINE` is `1` or `true`.
pub fn offline() -> bool {
    std::env::var(vars::SVSYNC_OFFLINE).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Returns the tracing filter directive from `SVSYNC_LOG`, if set.
pub fn log_filter() -> Option<String> {
    std::env::var(vars::SVSYNC_LOG).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
