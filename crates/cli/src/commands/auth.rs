// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Credential commands.
//!
//! The token is written to `credentials` in the svsync home. Queued writes
//! are kept across logout and a rejected credential, so they replay under
//! the next login.

use crate::commands::{open_session, Session};
use crate::error::Result;
use crate::sync::CredentialStore;

pub fn login(token: &str) -> Result<()> {
    let session = open_session(false)?;
    let pending = login_impl(&session, token)?;

    println!("Logged in");
    if pending > 0 {
        println!("{} queued write(s) waiting; run 'svsync drain' to replay", pending);
    }
    Ok(())
}

pub fn logout() -> Result<()> {
    let session = open_session(false)?;
    logout_impl(&session)?;
    println!("Logged out");
    Ok(())
}

/// Store the token and return the number of queued writes.
pub(crate) fn login_impl(session: &Session, token: &str) -> Result<usize> {
    session.credentials.store(token)?;
    Ok(session.engine.pending_count()?)
}

pub(crate) fn logout_impl(session: &Session) -> Result<()> {
    session.credentials.clear()?;
    Ok(())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
