// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core tenancy types for Keel.
//!
//! This crate holds the values the provisioning engine works with:
//!
//! - Internal ID newtypes ([`OrgId`], [`AppId`], ...) and opaque
//!   [`ExternalId`]s, the only identifiers handed to callers
//! - Entities ([`Org`], [`App`], [`User`], ...) as plain values linked by ID
//! - [`Audit`] and [`SimpleAudit`] provenance stamps
//! - API key material sealed with AES-256-GCM ([`ApiKey`], [`EncryptionKey`])
//! - The [`EntityFactory`] that builds all of the above without I/O
//! - An injectable [`Clock`]

pub mod audit;
pub mod clock;
pub mod entity;
pub mod error;
pub mod factory;
pub mod secure;
pub mod types;

pub use audit::{Audit, AuditApp, AuditUser, SimpleAudit};
pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::{
	App, Org, OrgKind, Person, Profile, User, GENESIS_KIND, STANDARD_KIND, TEST_KIND,
};
pub use error::{CoreError, Result};
pub use factory::EntityFactory;
pub use secure::{
	ApiKey, ApiKeySecret, EncryptionKey, ExternalId, OsRandom, RandomSource, SecureError,
};
pub use types::{AppId, OrgId, OrgKindId, PersonId, ProfileId, UserId};
