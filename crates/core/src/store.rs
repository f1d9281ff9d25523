// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable store for the offline queue.
//!
//! The [`QueueStore`] keeps pending mutations, the dead-letter log of
//! mutations that could never be applied, and the placeholder-to-server id
//! map used when replaying writes that reference entities created offline.
//!
//! All access goes through a single mutex-guarded connection, so enqueue,
//! peek and remove never observe each other half-done.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::mutation::{DeadLetter, MutationId, MutationRequest, MutationStatus, QueuedMutation};

/// Default bound on the number of pending mutations.
pub const DEFAULT_CAPACITY: usize = 1000;

/// SQL schema for the queue database.
pub const SCHEMA: &str = r#"
-- Pending writes; AUTOINCREMENT keeps ids monotonic across deletes
CREATE TABLE IF NOT EXISTS mutations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    endpoint TEXT NOT NULL,
    method TEXT NOT NULL,
    payload TEXT NOT NULL,
    enqueued_at TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    attempts INTEGER NOT NULL DEFAULT 0,
    last_error TEXT
);

-- Mutations rejected by the server during replay
CREATE TABLE IF NOT EXISTS dead_letters (
    id INTEGER PRIMARY KEY,
    endpoint TEXT NOT NULL,
    method TEXT NOT NULL,
    payload TEXT NOT NULL,
    enqueued_at TEXT NOT NULL,
    attempts INTEGER NOT NULL,
    status INTEGER,
    reason TEXT NOT NULL,
    discarded_at TEXT NOT NULL
);

-- Optimistic placeholder ids resolved to server-assigned ids, stored as JSON
CREATE TABLE IF NOT EXISTS id_map (
    placeholder TEXT PRIMARY KEY,
    real_id TEXT NOT NULL,
    mapped_at TEXT NOT NULL
);
"#;

const MUTATION_COLUMNS: &str =
    "id, endpoint, method, payload, enqueued_at, status, attempts, last_error";

/// Wrap a parse failure as a rusqlite conversion error.
fn corrupted(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(value: &str, column: usize) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(column, format!("invalid timestamp '{value}'")))
}

fn parse_payload(value: &str, column: usize) -> std::result::Result<Value, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| corrupted(column, format!("invalid payload: {e}")))
}

fn mutation_from_row(row: &Row<'_>) -> std::result::Result<QueuedMutation, rusqlite::Error> {
    let method: String = row.get(2)?;
    let payload: String = row.get(3)?;
    let enqueued_at: String = row.get(4)?;
    let status: String = row.get(5)?;
    Ok(QueuedMutation {
        id: row.get(0)?,
        endpoint: row.get(1)?,
        method: method
            .parse()
            .map_err(|_| corrupted(2, format!("invalid method '{method}'")))?,
        payload: parse_payload(&payload, 3)?,
        enqueued_at: parse_timestamp(&enqueued_at, 4)?,
        status: status
            .parse()
            .map_err(|_| corrupted(5, format!("invalid status '{status}'")))?,
        attempts: row.get(6)?,
        last_error: row.get(7)?,
    })
}

fn dead_letter_from_row(row: &Row<'_>) -> std::result::Result<DeadLetter, rusqlite::Error> {
    let method: String = row.get(2)?;
    let payload: String = row.get(3)?;
    let enqueued_at: String = row.get(4)?;
    let discarded_at: String = row.get(8)?;
    Ok(DeadLetter {
        id: row.get(0)?,
        endpoint: row.get(1)?,
        method: method
            .parse()
            .map_err(|_| corrupted(2, format!("invalid method '{method}'")))?,
        payload: parse_payload(&payload, 3)?,
        enqueued_at: parse_timestamp(&enqueued_at, 4)?,
        attempts: row.get(5)?,
        status: row.get(6)?,
        reason: row.get(7)?,
        discarded_at: parse_timestamp(&discarded_at, 8)?,
    })
}

/// Apply the schema.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Ids written before the map held JSON are bare text.
fn parse_real_id(value: String) -> Value {
    serde_json::from_str(&value).unwrap_or(Value::String(value))
}

/// Durable FIFO of pending mutations.
pub struct QueueStore {
    conn: Mutex<Connection>,
    capacity: usize,
}

impl QueueStore {
    /// Open the queue at the given path, creating and migrating if needed.
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        run_migrations(&conn)?;

        Ok(QueueStore {
            conn: Mutex::new(conn),
            capacity,
        })
    }

    /// Open an in-memory queue (for testing).
    pub fn open_in_memory(capacity: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(QueueStore {
            conn: Mutex::new(conn),
            capacity,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Maximum number of pending mutations.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a mutation to the queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] when the queue already holds `capacity`
    /// mutations. Older entries are never evicted to make room.
    pub fn enqueue(&self, request: MutationRequest) -> Result<QueuedMutation> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM mutations", [], |row| row.get(0))?;
        if usize::try_from(count).unwrap_or(usize::MAX) >= self.capacity {
            return Err(Error::QueueFull {
                capacity: self.capacity,
            });
        }

        let enqueued_at = Utc::now();
        tx.execute(
            "INSERT INTO mutations (endpoint, method, payload, enqueued_at, status, attempts)
             VALUES (?1, ?2, ?3, ?4, 'pending', 0)",
            params![
                request.endpoint,
                request.method.as_str(),
                serde_json::to_string(&request.payload)?,
                enqueued_at.to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(QueuedMutation {
            id,
            endpoint: request.endpoint,
            method: request.method,
            payload: request.payload,
            enqueued_at,
            status: MutationStatus::Pending,
            attempts: 0,
            last_error: None,
        })
    }

    /// All pending mutations in enqueue order, without removing them.
    pub fn peek_all(&self) -> Result<Vec<QueuedMutation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MUTATION_COLUMNS} FROM mutations ORDER BY id ASC"
        ))?;
        let mutations = stmt
            .query_map([], mutation_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(mutations)
    }

    /// Look up a single pending mutation.
    pub fn get(&self, id: MutationId) -> Result<Option<QueuedMutation>> {
        let conn = self.conn()?;
        let mutation = conn
            .query_row(
                &format!("SELECT {MUTATION_COLUMNS} FROM mutations WHERE id = ?1"),
                params![id],
                mutation_from_row,
            )
            .optional()?;
        Ok(mutation)
    }

    /// Remove a mutation after it was applied. Returns false if it was not queued.
    pub fn remove(&self, id: MutationId) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM mutations WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Number of pending mutations.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM mutations", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Put rows left `in_flight` by an interrupted drain back to `pending`.
    ///
    /// Only call this while holding the right to drain: another process may
    /// be replaying those rows right now. Returns how many were reset.
    pub fn recover_in_flight(&self) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute(
            "UPDATE mutations SET status = 'pending' WHERE status = 'in_flight'",
            [],
        )?)
    }

    /// Flag a mutation as being replayed.
    pub fn mark_in_flight(&self, id: MutationId) -> Result<()> {
        self.set_status(id, "UPDATE mutations SET status = 'in_flight' WHERE id = ?1", params![id])
    }

    /// Record a replay attempt that could not reach the server.
    pub fn mark_failed(&self, id: MutationId, error: &str) -> Result<()> {
        self.set_status(
            id,
            "UPDATE mutations SET status = 'failed', attempts = attempts + 1, last_error = ?2
             WHERE id = ?1",
            params![id, error],
        )
    }

    fn set_status(&self, id: MutationId, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<()> {
        let conn = self.conn()?;
        if conn.execute(sql, params)? == 0 {
            return Err(Error::MutationNotFound(id));
        }
        Ok(())
    }

    /// Move a mutation the server rejected into the dead-letter log.
    pub fn discard(&self, id: MutationId, status: Option<u16>, reason: &str) -> Result<DeadLetter> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mutation = tx
            .query_row(
                &format!("SELECT {MUTATION_COLUMNS} FROM mutations WHERE id = ?1"),
                params![id],
                mutation_from_row,
            )
            .optional()?
            .ok_or(Error::MutationNotFound(id))?;

        let attempts = mutation.attempts + 1;
        let discarded_at = Utc::now();
        tx.execute(
            "INSERT OR REPLACE INTO dead_letters
             (id, endpoint, method, payload, enqueued_at, attempts, status, reason, discarded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                mutation.id,
                mutation.endpoint,
                mutation.method.as_str(),
                serde_json::to_string(&mutation.payload)?,
                mutation.enqueued_at.to_rfc3339(),
                attempts,
                status,
                reason,
                discarded_at.to_rfc3339(),
            ],
        )?;
        tx.execute("DELETE FROM mutations WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(DeadLetter {
            id: mutation.id,
            endpoint: mutation.endpoint,
            method: mutation.method,
            payload: mutation.payload,
            enqueued_at: mutation.enqueued_at,
            attempts,
            status,
            reason: reason.to_string(),
            discarded_at,
        })
    }

    /// Permanently failed mutations, oldest first.
    pub fn dead_letters(&self) -> Result<Vec<DeadLetter>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, endpoint, method, payload, enqueued_at, attempts, status, reason, discarded_at
             FROM dead_letters ORDER BY id ASC",
        )?;
        let letters = stmt
            .query_map([], dead_letter_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(letters)
    }

    /// Forget all dead letters. Returns how many were removed.
    pub fn clear_dead_letters(&self) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM dead_letters", [])?)
    }

    /// Remove an applied create and remember the id the server gave it.
    pub fn complete_create(&self, id: MutationId, placeholder: &str, real_id: &Value) -> Result<()> {
        let real_id = serde_json::to_string(real_id)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO id_map (placeholder, real_id, mapped_at) VALUES (?1, ?2, ?3)",
            params![placeholder, real_id, Utc::now().to_rfc3339()],
        )?;
        tx.execute("DELETE FROM mutations WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    /// All known placeholder to server id mappings.
    pub fn id_map(&self) -> Result<HashMap<String, Value>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT placeholder, real_id FROM id_map")?;
        let map = stmt
            .query_map([], |row| Ok((row.get(0)?, parse_real_id(row.get(1)?))))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(map)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
