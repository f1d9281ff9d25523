// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the queue store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::mutation::Method;
use serde_json::json;
use tempfile::tempdir;

fn request(method: Method, endpoint: &str, payload: serde_json::Value) -> MutationRequest {
    MutationRequest::new(method, endpoint, payload).unwrap()
}

fn create(name: &str) -> MutationRequest {
    request(Method::Create, "/campaigns", json!({ "name": name }))
}

fn store() -> QueueStore {
    QueueStore::open_in_memory(DEFAULT_CAPACITY).unwrap()
}

#[test]
fn empty_store() {
    let store = store();
    assert!(store.is_empty().unwrap());
    assert_eq!(store.len().unwrap(), 0);
    assert!(store.peek_all().unwrap().is_empty());
}

#[test]
fn enqueue_assigns_increasing_ids() {
    let store = store();
    let first = store.enqueue(create("a")).unwrap();
    let second = store.enqueue(create("b")).unwrap();
    assert!(second.id > first.id);
    assert_eq!(first.status, MutationStatus::Pending);
    assert_eq!(first.attempts, 0);
}

#[test]
fn peek_all_is_fifo() {
    let store = store();
    store.enqueue(create("a")).unwrap();
    store
        .enqueue(request(Method::Patch, "/campaigns/1", json!({"name": "b"})))
        .unwrap();
    store.enqueue(request(Method::Delete, "/campaigns/1", json!(null))).unwrap();

    let all = store.peek_all().unwrap();
    let methods: Vec<Method> = all.iter().map(|m| m.method).collect();
    assert_eq!(methods, vec![Method::Create, Method::Patch, Method::Delete]);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(all[0].payload, json!({"name": "a"}));
}

#[test]
fn peek_does_not_remove() {
    let store = store();
    store.enqueue(create("a")).unwrap();
    store.peek_all().unwrap();
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn remove_by_id() {
    let store = store();
    let a = store.enqueue(create("a")).unwrap();
    let b = store.enqueue(create("b")).unwrap();

    assert!(store.remove(a.id).unwrap());
    assert!(!store.remove(a.id).unwrap());

    let all = store.peek_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, b.id);
}

#[test]
fn ids_are_not_reused_after_removal() {
    let store = store();
    let a = store.enqueue(create("a")).unwrap();
    store.remove(a.id).unwrap();
    let b = store.enqueue(create("b")).unwrap();
    assert!(b.id > a.id);
}

#[test]
fn full_queue_rejects_new_writes() {
    let store = QueueStore::open_in_memory(2).unwrap();
    let first = store.enqueue(create("a")).unwrap();
    store.enqueue(create("b")).unwrap();

    let err = store.enqueue(create("c")).unwrap_err();
    assert!(matches!(err, Error::QueueFull { capacity: 2 }));

    // Nothing was evicted to make room
    let all = store.peek_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first.id);
}

#[test]
fn mark_failed_counts_attempts() {
    let store = store();
    let m = store.enqueue(create("a")).unwrap();

    store.mark_in_flight(m.id).unwrap();
    assert_eq!(store.get(m.id).unwrap().unwrap().status, MutationStatus::InFlight);

    store.mark_failed(m.id, "connection refused").unwrap();
    store.mark_failed(m.id, "timed out").unwrap();

    let stored = store.get(m.id).unwrap().unwrap();
    assert_eq!(stored.status, MutationStatus::Failed);
    assert_eq!(stored.attempts, 2);
    assert_eq!(stored.last_error.as_deref(), Some("timed out"));
}

#[test]
fn mark_unknown_mutation_fails() {
    let store = store();
    let err = store.mark_in_flight(99).unwrap_err();
    assert!(matches!(err, Error::MutationNotFound(99)));
}

#[test]
fn discard_moves_to_dead_letters() {
    let store = store();
    let a = store.enqueue(create("a")).unwrap();
    let b = store.enqueue(create("b")).unwrap();

    let letter = store.discard(a.id, Some(422), "name already taken").unwrap();
    assert_eq!(letter.id, a.id);
    assert_eq!(letter.status, Some(422));
    assert_eq!(letter.attempts, 1);

    let remaining = store.peek_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.id);

    let letters = store.dead_letters().unwrap();
    assert_eq!(letters.len(), 1);
    assert_eq!(letters[0].reason, "name already taken");
    assert_eq!(letters[0].payload, json!({"name": "a"}));

    assert_eq!(store.clear_dead_letters().unwrap(), 1);
    assert!(store.dead_letters().unwrap().is_empty());
}

#[test]
fn discard_unknown_mutation_fails() {
    let store = store();
    assert!(matches!(
        store.discard(5, None, "gone").unwrap_err(),
        Error::MutationNotFound(5)
    ));
}

#[test]
fn complete_create_records_mapping() {
    let store = store();
    let a = store.enqueue(create("a")).unwrap();

    store.complete_create(a.id, "local-1", &json!("srv-77")).unwrap();

    assert!(store.is_empty().unwrap());
    let map = store.id_map().unwrap();
    assert_eq!(map.get("local-1"), Some(&json!("srv-77")));
}

#[test]
fn id_map_keeps_numeric_ids_numeric() {
    let store = store();
    let a = store.enqueue(create("a")).unwrap();
    let b = store.enqueue(create("b")).unwrap();

    store.complete_create(a.id, "local-1", &json!(100)).unwrap();
    store.complete_create(b.id, "local-2", &json!("100")).unwrap();

    let map = store.id_map().unwrap();
    assert_eq!(map.get("local-1"), Some(&json!(100)));
    assert_eq!(map.get("local-2"), Some(&json!("100")));
}

#[test]
fn id_map_reads_bare_text_ids() {
    let store = store();
    store
        .conn()
        .unwrap()
        .execute(
            "INSERT INTO id_map (placeholder, real_id, mapped_at) VALUES ('local-4', 'srv-4', ?1)",
            params![Utc::now().to_rfc3339()],
        )
        .unwrap();
    assert_eq!(store.id_map().unwrap().get("local-4"), Some(&json!("srv-4")));
}

#[test]
fn queue_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.db");

    let ids: Vec<MutationId> = {
        let store = QueueStore::open(&path, DEFAULT_CAPACITY).unwrap();
        let a = store.enqueue(create("a")).unwrap();
        let b = store
            .enqueue(request(Method::Update, "/campaigns/local-1", json!({"name": "b"})))
            .unwrap();
        store.complete_create(a.id, "local-1", &json!(9)).unwrap();
        let c = store.enqueue(request(Method::Delete, "/roles/3", json!(null))).unwrap();
        vec![b.id, c.id]
    };

    let store = QueueStore::open(&path, DEFAULT_CAPACITY).unwrap();
    let all = store.peek_all().unwrap();
    assert_eq!(all.iter().map(|m| m.id).collect::<Vec<_>>(), ids);
    assert_eq!(all[0].endpoint, "/campaigns/local-1");
    assert_eq!(store.id_map().unwrap().get("local-1"), Some(&json!(9)));
}

#[test]
fn reopen_leaves_in_flight_rows_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("queue.db");

    let draining = QueueStore::open(&path, DEFAULT_CAPACITY).unwrap();
    let m = draining.enqueue(create("a")).unwrap();
    draining.mark_in_flight(m.id).unwrap();

    // A second handle (e.g. `status`) must not disturb a running drain.
    let other = QueueStore::open(&path, DEFAULT_CAPACITY).unwrap();
    assert_eq!(other.get(m.id).unwrap().unwrap().status, MutationStatus::InFlight);
}

#[test]
fn recover_in_flight_resets_to_pending() {
    let store = store();
    let a = store.enqueue(create("a")).unwrap();
    let b = store.enqueue(create("b")).unwrap();
    store.mark_in_flight(a.id).unwrap();
    store.mark_failed(b.id, "timeout").unwrap();

    assert_eq!(store.recover_in_flight().unwrap(), 1);
    assert_eq!(store.get(a.id).unwrap().unwrap().status, MutationStatus::Pending);
    assert_eq!(store.get(b.id).unwrap().unwrap().status, MutationStatus::Failed);
}

#[test]
fn open_creates_parent_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("queue.db");
    QueueStore::open(&path, DEFAULT_CAPACITY).unwrap();
    assert!(path.exists());
}
