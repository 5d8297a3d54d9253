// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory construction of tenancy entities.
//!
//! The factory assigns fresh internal and external identifiers and links
//! children to their parents. It performs no I/O. A child can only be built
//! from an already-built parent, which fixes the write order callers follow.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::entity::{App, Org, OrgKind, Person, Profile, User};
use crate::error::{CoreError, Result};
use crate::secure::{ApiKey, EncryptionKey, ExternalId, RandomSource};
use crate::types::{AppId, OrgId, OrgKindId, PersonId, ProfileId, UserId};

#[derive(Clone)]
pub struct EntityFactory {
	random: Arc<dyn RandomSource>,
	encryption_key: Arc<EncryptionKey>,
}

impl EntityFactory {
	pub fn new(random: Arc<dyn RandomSource>, encryption_key: Arc<EncryptionKey>) -> Self {
		Self {
			random,
			encryption_key,
		}
	}

	/// Key used to seal and open API key material.
	pub fn encryption_key(&self) -> &EncryptionKey {
		&self.encryption_key
	}

	pub fn new_org_kind(&self, external_id: &str, description: &str) -> OrgKind {
		OrgKind {
			id: OrgKindId::generate(),
			external_id: external_id.to_string(),
			description: description.to_string(),
		}
	}

	pub fn new_org(&self, name: &str, description: &str, kind: &OrgKind) -> Org {
		Org {
			id: OrgId::generate(),
			external_id: ExternalId::generate(),
			name: name.to_string(),
			description: description.to_string(),
			kind: kind.clone(),
		}
	}

	/// Build an app owned by `org` holding one freshly issued API key.
	pub fn new_app(
		&self,
		name: &str,
		description: &str,
		org: &Org,
		deactivation: DateTime<Utc>,
	) -> Result<App> {
		let key = self.new_api_key(deactivation)?;
		Ok(App {
			id: AppId::generate(),
			external_id: ExternalId::generate(),
			org_id: org.id,
			name: name.to_string(),
			description: description.to_string(),
			api_keys: vec![key],
		})
	}

	pub fn new_api_key(&self, deactivation: DateTime<Utc>) -> Result<ApiKey> {
		Ok(ApiKey::issue(
			self.random.as_ref(),
			&self.encryption_key,
			deactivation,
		)?)
	}

	/// Build a person in `org` together with its profile.
	pub fn new_org_profile(&self, org: &Org, first_name: &str, last_name: &str) -> Profile {
		Profile {
			id: ProfileId::generate(),
			person: Person {
				id: PersonId::generate(),
				org_id: org.id,
			},
			first_name: first_name.to_string(),
			last_name: last_name.to_string(),
		}
	}

	/// Build a user in `org`. The username is trimmed and must not be empty.
	pub fn new_user(&self, username: &str, org: &Org, profile: Profile) -> Result<User> {
		let username = username.trim();
		if username.is_empty() {
			return Err(CoreError::Validation(
				"username is required".to_string(),
			));
		}
		if profile.person.org_id != org.id {
			return Err(CoreError::Validation(format!(
				"profile belongs to org {}, not {}",
				profile.person.org_id, org.id
			)));
		}
		Ok(User {
			id: UserId::generate(),
			username: username.to_string(),
			org_id: org.id,
			profile,
		})
	}
}
