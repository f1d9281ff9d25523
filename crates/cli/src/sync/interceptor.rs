// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation interceptor: decides between a live call and the offline queue.
//!
//! Reads always go to the server. Writes go live when the oracle reports
//! online, and are queued when it reports offline or when the live call fails
//! without a response. Error responses are returned to the caller and never
//! queued, since replaying them would fail the same way.

use serde::Serialize;
use serde_json::Value;
use svq_core::{optimistic_body, remap, Method, MutationId, MutationRequest, QueuedMutation};

use super::backend::{ApiRequest, Backend, CallError};
use super::engine::{SyncEngine, SyncError, SyncResult};
use super::replayer::HaltReason;

/// A write that was accepted locally and will be replayed later.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingWrite {
    pub mutation_id: MutationId,
    /// Optimistic id for queued creates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_id: Option<String>,
    /// Optimistic result echoing the payload.
    pub body: Value,
}

impl From<&QueuedMutation> for PendingWrite {
    fn from(mutation: &QueuedMutation) -> Self {
        PendingWrite {
            mutation_id: mutation.id,
            placeholder_id: mutation.placeholder_id(),
            body: optimistic_body(mutation),
        }
    }
}

/// What happened to a call made through the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PerformOutcome {
    /// The server applied the call; this is its response.
    Applied(Value),
    /// The write was queued; this is the optimistic result.
    Queued(PendingWrite),
}

impl PerformOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, PerformOutcome::Queued(_))
    }

    /// The value to hand to the caller: the real response or the optimistic one.
    pub fn into_value(self) -> Value {
        match self {
            PerformOutcome::Applied(value) => value,
            PerformOutcome::Queued(pending) => pending.body,
        }
    }
}

impl<B: Backend> SyncEngine<B> {
    /// Perform an API call, deferring writes that cannot reach the server.
    pub async fn perform(
        &self,
        method: Method,
        endpoint: &str,
        payload: Value,
    ) -> SyncResult<PerformOutcome> {
        if !method.is_write() {
            return self.get(endpoint).await.map(PerformOutcome::Applied);
        }

        let request = MutationRequest::new(method, endpoint, payload)?;

        if !self.connectivity.is_online() {
            tracing::debug!("offline, queueing {} {}", method, endpoint);
            return self.divert(request);
        }

        if self.options.preserve_order && !self.store.is_empty()? {
            // Earlier writes are still queued: flush them first so this one
            // cannot overtake them. If someone else is already draining, the
            // drain is skipped and this write waits behind the backlog.
            let report = self.drain().await?;
            if report.halted == Some(HaltReason::Unauthorized) {
                return Err(SyncError::Unauthorized {
                    login_url: self.options.login_url.clone(),
                });
            }
            if !self.store.is_empty()? {
                tracing::debug!("queue not empty, queueing {} {} behind it", method, endpoint);
                return self.divert(request);
            }
        }

        let map = self.store.id_map()?;
        let (resolved_endpoint, body) = remap::resolve(&request.endpoint, &request.payload, &map);
        let api = ApiRequest::new(method, resolved_endpoint, Some(body))
            .with_token(self.credentials.token());

        match self.backend.call(api).await {
            Ok(response) => Ok(PerformOutcome::Applied(response)),
            Err(CallError::Network(msg)) => {
                tracing::warn!("{} {} unreachable, queueing: {}", method, endpoint, msg);
                self.divert(request)
            }
            Err(CallError::Unauthorized) => Err(self.unauthorized()),
            Err(CallError::Application { status, message }) => {
                Err(SyncError::Rejected { status, message })
            }
        }
    }

    /// Perform a read. Reads are never queued, whatever the connectivity.
    pub async fn get(&self, endpoint: &str) -> SyncResult<Value> {
        let map = self.store.id_map()?;
        let (endpoint, _) = remap::resolve(endpoint, &Value::Null, &map);
        let api = ApiRequest::new(Method::Get, endpoint, None).with_token(self.credentials.token());

        match self.backend.call(api).await {
            Ok(response) => Ok(response),
            Err(CallError::Network(msg)) => Err(SyncError::Unreachable(msg)),
            Err(CallError::Unauthorized) => Err(self.unauthorized()),
            Err(CallError::Application { status, message }) => {
                Err(SyncError::Rejected { status, message })
            }
        }
    }

    /// Queue a write and ask the host for a replay opportunity.
    fn divert(&self, request: MutationRequest) -> SyncResult<PerformOutcome> {
        let mutation = self.store.enqueue(request)?;
        tracing::info!(
            "queued mutation #{}: {} {}",
            mutation.id,
            mutation.method,
            mutation.endpoint
        );
        self.trigger.request_sync();
        Ok(PerformOutcome::Queued(PendingWrite::from(&mutation)))
    }
}
