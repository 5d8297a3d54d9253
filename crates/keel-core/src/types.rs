// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Internal identifier newtypes.
//!
//! Every persisted entity has an internal UUID that never leaves the
//! provisioning boundary. Wrapping each one in its own type keeps an
//! [`AppId`] from being bound where an [`OrgId`] is expected. Outward-facing
//! identifiers are [`crate::ExternalId`] values instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Wrap an existing UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Parse the string form stored in the database.
			pub fn parse(s: &str) -> Result<Self, uuid::Error> {
				Uuid::parse_str(s).map(Self)
			}

			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}
	};
}

define_id_type!(OrgKindId, "Internal identifier for an organization kind.");
define_id_type!(OrgId, "Internal identifier for an organization.");
define_id_type!(AppId, "Internal identifier for an application.");
define_id_type!(PersonId, "Internal identifier for a person.");
define_id_type!(ProfileId, "Internal identifier for a person profile.");
define_id_type!(UserId, "Internal identifier for a user.");
