// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the mutation interceptor.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::backend::CallError;
use super::backend_tests::MockBackend;
use super::credentials::CredentialStore;
use super::engine::SyncError;
use super::interceptor::PerformOutcome;
use super::test_helpers::{harness, harness_in_dir, harness_with_store};
use serde_json::json;
use std::time::Duration;
use svq_core::{Method, MutationRequest, MutationStatus, QueueStore};

#[tokio::test]
async fn online_write_goes_live() {
    let h = harness();

    let outcome = h
        .engine
        .perform(Method::Create, "/roles", json!({"name": "admin"}))
        .await
        .unwrap();

    assert_eq!(outcome, PerformOutcome::Applied(json!({"id": 100})));
    assert_eq!(h.engine.pending_count().unwrap(), 0);
    let calls = h.backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].token.as_deref(), Some("secret"));
    assert_eq!(calls[0].body, Some(json!({"name": "admin"})));
}

#[tokio::test]
async fn offline_write_is_queued_with_optimistic_result() {
    let h = harness();
    h.connectivity.set_online(false);

    let outcome = h
        .engine
        .perform(Method::Create, "/campaigns", json!({"name": "NPS"}))
        .await
        .unwrap();

    let PerformOutcome::Queued(pending) = outcome else {
        panic!("expected queued outcome");
    };
    let placeholder = pending.placeholder_id.clone().unwrap();
    assert_eq!(placeholder, format!("local-{}", pending.mutation_id));
    assert_eq!(pending.body["id"], json!(placeholder));
    assert_eq!(pending.body["name"], json!("NPS"));
    assert_eq!(pending.body["_pending"], json!(true));

    // No network call attempted, sync requested
    assert!(h.backend.calls().is_empty());
    assert_eq!(h.trigger.request_count(), 1);
    assert_eq!(h.engine.pending_count().unwrap(), 1);
}

#[tokio::test]
async fn network_failure_diverts_to_queue() {
    let h = harness();
    h.backend.push_response(Err(CallError::Network("connection refused".into())));

    let outcome = h
        .engine
        .perform(Method::Update, "/roles/3", json!({"name": "editor"}))
        .await
        .unwrap();

    assert!(outcome.is_queued());
    assert_eq!(h.backend.calls().len(), 1);
    assert_eq!(h.trigger.request_count(), 1);

    let queued = h.engine.store().peek_all().unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].method, Method::Update);
    assert_eq!(queued[0].endpoint, "/roles/3");
}

#[tokio::test]
async fn application_error_propagates_and_is_not_queued() {
    let h = harness();
    h.backend.push_response(Err(CallError::Application {
        status: 422,
        message: "name is required".into(),
    }));

    let err = h
        .engine
        .perform(Method::Create, "/roles", json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Rejected { status: 422, .. }));
    assert_eq!(h.engine.pending_count().unwrap(), 0);
    assert_eq!(h.trigger.request_count(), 0);
}

#[tokio::test]
async fn unauthorized_write_clears_credentials_and_is_not_queued() {
    let h = harness();
    h.backend.push_response(Err(CallError::Unauthorized));

    let err = h
        .engine
        .perform(Method::Delete, "/roles/3", json!(null))
        .await
        .unwrap_err();

    match err {
        SyncError::Unauthorized { login_url } => assert_eq!(login_url, "/login"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.credentials.token().is_none());
    assert_eq!(h.engine.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn reads_are_never_queued_even_offline() {
    let h = harness();
    h.connectivity.set_online(false);
    h.backend.push_response(Ok(json!([{"id": 1, "name": "admin"}])));

    let roles = h.engine.get("/roles").await.unwrap();
    assert_eq!(roles, json!([{"id": 1, "name": "admin"}]));

    h.backend.set_offline(true);
    let err = h
        .engine
        .perform(Method::Get, "/roles", json!(null))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Unreachable(_)));
    assert_eq!(h.engine.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn unauthorized_read_clears_credentials() {
    let h = harness();
    h.backend.push_response(Err(CallError::Unauthorized));
    let err = h.engine.get("/campaigns").await.unwrap_err();
    assert!(matches!(err, SyncError::Unauthorized { .. }));
    assert!(h.credentials.token().is_none());
}

#[tokio::test]
async fn full_queue_surfaces_storage_error() {
    let h = harness_with_store(QueueStore::open_in_memory(1).unwrap(), MockBackend::new());
    h.connectivity.set_online(false);

    h.engine
        .perform(Method::Create, "/roles", json!({"name": "a"}))
        .await
        .unwrap();
    let err = h
        .engine
        .perform(Method::Create, "/roles", json!({"name": "b"}))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Store(svq_core::Error::QueueFull { capacity: 1 })
    ));
    assert_eq!(h.engine.pending_count().unwrap(), 1);
}

#[tokio::test]
async fn live_write_flushes_queue_first() {
    let h = harness();
    h.connectivity.set_online(false);
    h.engine
        .perform(Method::Create, "/campaigns", json!({"name": "A"}))
        .await
        .unwrap();

    h.connectivity.set_online(true);
    let outcome = h
        .engine
        .perform(Method::Patch, "/campaigns/local-1", json!({"status": "active"}))
        .await
        .unwrap();

    assert!(!outcome.is_queued());
    assert_eq!(
        h.backend.call_log(),
        vec![
            (Method::Create, "/campaigns".to_string()),
            (Method::Patch, "/campaigns/100".to_string()),
        ]
    );
}

#[tokio::test]
async fn live_write_queues_behind_unreachable_backlog() {
    let h = harness();
    h.connectivity.set_online(false);
    h.engine
        .perform(Method::Create, "/campaigns", json!({"name": "A"}))
        .await
        .unwrap();

    // Oracle says online but the server is still unreachable
    h.connectivity.set_online(true);
    h.backend.set_offline(true);
    let outcome = h
        .engine
        .perform(Method::Delete, "/roles/9", json!(null))
        .await
        .unwrap();

    assert!(outcome.is_queued());
    // Only the replay attempt of the first mutation hit the network
    assert_eq!(h.backend.calls().len(), 1);
    let methods: Vec<Method> = h
        .engine
        .store()
        .peek_all()
        .unwrap()
        .iter()
        .map(|m| m.method)
        .collect();
    assert_eq!(methods, vec![Method::Create, Method::Delete]);
}

#[tokio::test]
async fn into_value_returns_optimistic_body() {
    let h = harness();
    h.connectivity.set_online(false);
    let value = h
        .engine
        .perform(Method::Patch, "/payment-methods/2", json!({"enabled": false}))
        .await
        .unwrap()
        .into_value();
    assert_eq!(value["enabled"], json!(false));
    assert_eq!(value["_pending"], json!(true));
}

#[tokio::test]
async fn write_from_second_process_waits_for_running_drain() {
    let dir = tempfile::TempDir::new().unwrap();
    let watcher = harness_in_dir(
        dir.path(),
        MockBackend::new().with_delay(Duration::from_millis(200)),
    );
    let sender = harness_in_dir(dir.path(), MockBackend::new());
    watcher
        .engine
        .store()
        .enqueue(MutationRequest::new(Method::Create, "/roles", json!({"name": "a"})).unwrap())
        .unwrap();

    let (report, outcome) = tokio::join!(watcher.engine.drain(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        sender
            .engine
            .perform(Method::Create, "/channels", json!({"kind": "sms"}))
            .await
    });

    let report = report.unwrap();
    assert_eq!(report.applied, vec![1]);
    assert!(outcome.unwrap().is_queued());

    // `/roles` went out once, from the process holding the lock.
    assert_eq!(watcher.backend.call_log(), vec![(Method::Create, "/roles".to_string())]);
    assert!(sender.backend.calls().is_empty());

    let queued = sender.engine.store().peek_all().unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].endpoint, "/channels");
}

#[tokio::test]
async fn drain_resumes_rows_left_in_flight() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let crashed = harness_in_dir(dir.path(), MockBackend::new());
        let m = crashed
            .engine
            .store()
            .enqueue(MutationRequest::new(Method::Delete, "/roles/3", json!(null)).unwrap())
            .unwrap();
        crashed.engine.store().mark_in_flight(m.id).unwrap();
    }

    let h = harness_in_dir(dir.path(), MockBackend::new());
    assert_eq!(
        h.engine.store().peek_all().unwrap()[0].status,
        MutationStatus::InFlight
    );
    let report = h.engine.drain().await.unwrap();
    assert_eq!(report.applied, vec![1]);
    assert_eq!(h.engine.pending_count().unwrap(), 0);
}
