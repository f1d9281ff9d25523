// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::open_session_at;
use crate::config::Config;
use serde_json::{json, Value};
use svq_core::{Method, MutationRequest};
use tempfile::TempDir;

fn offline_session(temp: &TempDir) -> Session {
    let config = Config::new("http://127.0.0.1:9").unwrap();
    open_session_at(temp.path().to_path_buf(), config, true, None).unwrap()
}

#[test]
fn collect_counts_queue_state() {
    let temp = TempDir::new().unwrap();
    let session = offline_session(&temp);
    let store = session.engine.store();
    for endpoint in ["/roles/1", "/roles/2", "/roles/3"] {
        store
            .enqueue(MutationRequest::new(Method::Update, endpoint, json!({})).unwrap())
            .unwrap();
    }
    store.mark_failed(1, "timed out").unwrap();
    store.discard(3, Some(409), "conflict").unwrap();

    let report = collect(&session).unwrap();
    assert_eq!(report.api, "http://127.0.0.1:9");
    assert_eq!(report.connectivity, "offline");
    assert!(!report.logged_in);
    assert_eq!(report.pending, 2);
    assert_eq!(report.retrying, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.capacity, svq_core::DEFAULT_CAPACITY);
    assert!(!report.draining);
}

#[test]
fn collect_sees_held_lock() {
    let temp = TempDir::new().unwrap();
    let session = offline_session(&temp);
    let _lock = DrainLock::new(lock_path(temp.path())).try_acquire().unwrap().unwrap();

    assert!(collect(&session).unwrap().draining);
}

#[test]
fn render_text_and_json() {
    let report = StatusReport {
        api: "https://api.example.com".to_string(),
        connectivity: "online",
        logged_in: true,
        pending: 2,
        retrying: 1,
        rejected: 3,
        capacity: 1000,
        draining: false,
    };

    let text = render(&report, OutputFormat::Text).unwrap();
    assert!(text.contains("API: https://api.example.com (online)"));
    assert!(text.contains("Credential: stored"));
    assert!(text.contains("Queued: 2/1000 (1 waiting to retry)"));
    assert!(text.contains("Rejected: 3"));

    let value: Value = serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(value["pending"], json!(2));
    assert_eq!(value["connectivity"], json!("online"));
    assert_eq!(value["draining"], json!(false));
}
