// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use keel_core::{Audit, AuditApp, AuditUser, Clock};
use keel_db::{app, user, Datastore};
use sqlx::SqliteConnection;

use crate::error::{ProvisioningError, Result};
use crate::transaction::TransactionCoordinator;

/// Builds the acting [`Audit`] for a caller identified by app and username.
#[derive(Clone)]
pub struct AuditService {
	coordinator: TransactionCoordinator,
	clock: Arc<dyn Clock>,
}

impl AuditService {
	pub fn new(datastore: Arc<dyn Datastore>, clock: Arc<dyn Clock>) -> Self {
		Self {
			coordinator: TransactionCoordinator::new(datastore),
			clock,
		}
	}

	/// Resolve an app and a user of the app's org, stamped with the clock's
	/// current moment.
	///
	/// # Errors
	/// `NotExist` if the app is unknown or the user is not in its org.
	#[tracing::instrument(skip(self))]
	pub async fn stamp(&self, app_external_id: &str, username: &str) -> Result<Audit> {
		let mut tx = self.coordinator.begin().await?;
		let outcome = self.stamp_in(&mut tx, app_external_id, username).await;
		self.coordinator.finish(tx, outcome).await
	}

	async fn stamp_in(
		&self,
		conn: &mut SqliteConnection,
		app_external_id: &str,
		username: &str,
	) -> Result<Audit> {
		let acting_app = app::find_app_by_external_id(conn, app_external_id)
			.await?
			.ok_or_else(|| {
				ProvisioningError::NotExist(format!("app {app_external_id} does not exist"))
			})?;
		let acting_user = user::find_user_by_username(conn, &acting_app.org_id, username.trim())
			.await?
			.ok_or_else(|| {
				ProvisioningError::NotExist(format!(
					"user {username} does not exist in the org of app {app_external_id}"
				))
			})?;

		Ok(Audit::from_parts(
			AuditApp {
				id: acting_app.id,
				external_id: acting_app.external_id,
			},
			AuditUser {
				id: acting_user.user.id,
				username: acting_user.user.username,
				first_name: acting_user.user.profile.first_name,
				last_name: acting_user.user.profile.last_name,
			},
			self.clock.now(),
		))
	}
}
