// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for Keel.
//!
//! This crate provides:
//! - Pool creation and schema migrations
//! - The [`Datastore`] seam (ping, begin a transaction)
//! - Row-level operations per table, each taking a `&mut SqliteConnection`
//!   so they run equally inside a transaction or on a pooled connection
//!
//! Writes return `rows_affected`; lookups return `Option`. Deciding whether
//! a count or a missing row is an error belongs to the caller.

pub mod app;
mod audit;
pub mod datastore;
pub mod error;
pub mod org;
pub mod org_kind;
pub mod pool;
pub mod schema;
pub mod user;

#[cfg(test)]
mod test_support;

pub use app::{AppRecord, StoredApiKey};
pub use datastore::{Datastore, SqliteDatastore, Tx};
pub use error::{expect_single_row, DbError, Result};
pub use org::OrgRecord;
pub use org_kind::OrgKindRecord;
pub use pool::{create_memory_pool, create_pool};
pub use schema::run_migrations;
pub use user::UserRecord;
