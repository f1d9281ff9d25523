// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process drain lock.
//!
//! Several svsync processes can share one queue file. An advisory lock on a
//! sibling file decides which of them may replay it; the others leave the
//! queue alone until the lock is free.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// Path of the lock file guarding a queue.
#[derive(Debug, Clone)]
pub struct DrainLock {
    path: PathBuf,
}

impl DrainLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DrainLock { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the lock without waiting.
    ///
    /// Returns `None` when someone else holds it. The lock is released when
    /// the returned file is dropped.
    pub fn try_acquire(&self) -> io::Result<Option<File>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(file)),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// True if another handle holds the lock right now.
    pub fn is_held(&self) -> io::Result<bool> {
        Ok(self.try_acquire()?.is_none())
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
