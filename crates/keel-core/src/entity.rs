// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tenancy entities.
//!
//! Entities are plain values. Relations are carried as internal IDs
//! ([`App::org_id`], [`User::org_id`]) rather than embedded parents, except
//! for [`Org::kind`], which is an immutable lookup row and travels by value.

use crate::secure::{ApiKey, ExternalId};
use crate::types::{AppId, OrgId, OrgKindId, PersonId, ProfileId, UserId};

/// Kind tag of the one organization created by the genesis bootstrap.
pub const GENESIS_KIND: &str = "genesis";

/// Kind tag for disposable test organizations.
pub const TEST_KIND: &str = "test";

/// Kind tag for ordinary organizations.
pub const STANDARD_KIND: &str = "standard";

/// Classification of an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgKind {
	pub id: OrgKindId,
	/// Human-readable tag such as `genesis`, `test` or `standard`.
	pub external_id: String,
	pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Org {
	pub id: OrgId,
	pub external_id: ExternalId,
	pub name: String,
	pub description: String,
	pub kind: OrgKind,
}

#[derive(Debug, Clone)]
pub struct App {
	pub id: AppId,
	pub external_id: ExternalId,
	pub org_id: OrgId,
	pub name: String,
	pub description: String,
	pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
	pub id: PersonId,
	pub org_id: OrgId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
	pub id: ProfileId,
	pub person: Person,
	pub first_name: String,
	pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub org_id: OrgId,
	pub profile: Profile,
}
