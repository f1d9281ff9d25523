// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! svq-core: Offline mutation queue primitives
//!
//! This crate provides the data model for deferred writes, the durable
//! SQLite queue they wait in, and the placeholder id remapping applied when
//! they are replayed. It has no network or async dependencies; the `svsync`
//! crate drives it.

pub mod error;
pub mod mutation;
pub mod remap;
pub mod store;

pub use error::{Error, Result};
pub use mutation::{
    is_placeholder, optimistic_body, placeholder_id, DeadLetter, Method, MutationId,
    MutationRequest, MutationStatus, QueuedMutation, PLACEHOLDER_PREFIX,
};
pub use store::{QueueStore, DEFAULT_CAPACITY};
