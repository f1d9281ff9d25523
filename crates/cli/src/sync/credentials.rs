// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer token storage.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Where the API bearer token lives.
pub trait CredentialStore: Send + Sync {
    /// The current token, if logged in.
    fn token(&self) -> Option<String>;

    /// Replace the stored token.
    fn store(&self, token: &str) -> io::Result<()>;

    /// Forget the token. Clearing an empty store is not an error.
    fn clear(&self) -> io::Result<()>;
}

/// Token kept in a single file.
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: &Path) -> Self {
        FileCredentials {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentials {
    fn token(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn store(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", token.trim()))?;
        restrict_permissions(&self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// In-memory token (for embedding and tests).
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: RwLock<Option<String>>,
}

impl MemoryCredentials {
    pub fn new(token: Option<&str>) -> Self {
        MemoryCredentials {
            token: RwLock::new(token.map(String::from)),
        }
    }
}

impl CredentialStore for MemoryCredentials {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn store(&self, token: &str) -> io::Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| io::Error::other("credential lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| io::Error::other("credential lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
