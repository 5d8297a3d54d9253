// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit provenance for mutations.
//!
//! An [`Audit`] records which app and user performed a mutation and when. A
//! [`SimpleAudit`] pairs the create stamp, fixed at birth, with the most
//! recent update stamp.

use chrono::{DateTime, Utc};

use crate::entity::{App, User};
use crate::secure::ExternalId;
use crate::types::{AppId, UserId};

/// The app that performed a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditApp {
	pub id: AppId,
	pub external_id: ExternalId,
}

/// The user that performed a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditUser {
	pub id: UserId,
	pub username: String,
	pub first_name: String,
	pub last_name: String,
}

/// A single provenance stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
	app: AuditApp,
	user: AuditUser,
	moment: DateTime<Utc>,
}

impl Audit {
	pub fn new(app: &App, user: &User, moment: DateTime<Utc>) -> Self {
		Self {
			app: AuditApp {
				id: app.id,
				external_id: app.external_id.clone(),
			},
			user: AuditUser {
				id: user.id,
				username: user.username.clone(),
				first_name: user.profile.first_name.clone(),
				last_name: user.profile.last_name.clone(),
			},
			moment,
		}
	}

	/// Rebuild a stamp read back from storage.
	pub fn from_parts(app: AuditApp, user: AuditUser, moment: DateTime<Utc>) -> Self {
		Self { app, user, moment }
	}

	pub fn app(&self) -> &AuditApp {
		&self.app
	}

	pub fn user(&self) -> &AuditUser {
		&self.user
	}

	pub fn moment(&self) -> DateTime<Utc> {
		self.moment
	}
}

/// Create and update provenance for a mutable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleAudit {
	create: Audit,
	update: Audit,
}

impl SimpleAudit {
	/// Stamp for a newly created entity. Create and update are equal.
	pub fn new(audit: Audit) -> Self {
		Self {
			create: audit.clone(),
			update: audit,
		}
	}

	/// Rebuild a pair read back from storage.
	pub fn from_parts(create: Audit, update: Audit) -> Self {
		Self { create, update }
	}

	/// Replace the update stamp. The create stamp is kept.
	pub fn touch(self, audit: Audit) -> Self {
		Self {
			create: self.create,
			update: audit,
		}
	}

	pub fn create(&self) -> &Audit {
		&self.create
	}

	pub fn update(&self) -> &Audit {
		&self.update
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use proptest::prelude::*;

	fn audit(username: &str, secs: i64) -> Audit {
		Audit::from_parts(
			AuditApp {
				id: AppId::generate(),
				external_id: ExternalId::generate(),
			},
			AuditUser {
				id: UserId::generate(),
				username: username.to_string(),
				first_name: "Ada".to_string(),
				last_name: "Lovelace".to_string(),
			},
			Utc.timestamp_opt(secs, 0).unwrap(),
		)
	}

	#[test]
	fn new_simple_audit_has_equal_stamps() {
		let stamp = audit("root", 1_700_000_000);
		let simple = SimpleAudit::new(stamp.clone());
		assert_eq!(simple.create(), &stamp);
		assert_eq!(simple.update(), &stamp);
	}

	#[test]
	fn touch_keeps_create_and_replaces_update() {
		let first = audit("root", 1_700_000_000);
		let second = audit("operator", 1_700_000_600);

		let simple = SimpleAudit::new(first.clone()).touch(second.clone());
		assert_eq!(simple.create(), &first);
		assert_eq!(simple.update(), &second);
	}

	proptest! {
		#[test]
		fn prop_touch_never_rewrites_create(
			names in proptest::collection::vec("[a-z]{1,12}", 1..8),
			start in 0i64..4_000_000_000,
		) {
			let birth = audit("founder", start);
			let mut simple = SimpleAudit::new(birth.clone());
			for (i, name) in names.iter().enumerate() {
				let next = audit(name, start + i as i64 + 1);
				simple = simple.touch(next.clone());
				prop_assert_eq!(simple.create(), &birth);
				prop_assert_eq!(simple.update(), &next);
			}
		}
	}
}
