// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use keel_core::{Audit, EntityFactory, SimpleAudit, User};
use keel_db::{expect_single_row, user, Datastore};
use sqlx::SqliteConnection;

use crate::error::{ProvisioningError, Result};
use crate::org::find_org_record;
use crate::request::CreateUserRequest;
use crate::response::UserResponse;
use crate::transaction::TransactionCoordinator;

/// Write the person, the profile and then the user.
pub(crate) async fn create_user_tx(
	conn: &mut SqliteConnection,
	user: &User,
	audit: &SimpleAudit,
) -> Result<()> {
	let rows = user::insert_person(conn, &user.profile.person).await?;
	expect_single_row("CreatePerson", rows)?;

	let rows = user::insert_profile(conn, &user.profile, audit).await?;
	expect_single_row("CreatePersonProfile", rows)?;

	let rows = user::insert_user(conn, user, audit).await?;
	expect_single_row("CreateUser", rows)?;
	Ok(())
}

/// Provisioning of users in existing orgs.
#[derive(Clone)]
pub struct UserService {
	coordinator: TransactionCoordinator,
	factory: EntityFactory,
}

impl UserService {
	pub fn new(datastore: Arc<dyn Datastore>, factory: EntityFactory) -> Self {
		Self {
			coordinator: TransactionCoordinator::new(datastore),
			factory,
		}
	}

	#[tracing::instrument(skip(self, request, audit), fields(org_external_id = %request.org_external_id))]
	pub async fn create(&self, request: &CreateUserRequest, audit: &Audit) -> Result<UserResponse> {
		request.validate()?;

		let mut tx = self.coordinator.begin().await?;
		let outcome = self.create_in(&mut tx, request, audit).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(username = %response.username, org_external_id = %response.org_external_id, "user created");
		Ok(response)
	}

	async fn create_in(
		&self,
		conn: &mut SqliteConnection,
		request: &CreateUserRequest,
		audit: &Audit,
	) -> Result<UserResponse> {
		let owner = find_org_record(conn, &request.org_external_id).await?;

		let profile =
			self.factory
				.new_org_profile(&owner.org, &request.first_name, &request.last_name);
		let new_user = self.factory.new_user(&request.username, &owner.org, profile)?;

		if user::find_user_by_username(conn, &owner.org.id, &new_user.username)
			.await?
			.is_some()
		{
			return Err(ProvisioningError::Validation(format!(
				"username {} already exists in org {}",
				new_user.username, owner.org.external_id
			)));
		}

		let simple = SimpleAudit::new(audit.clone());
		create_user_tx(conn, &new_user, &simple).await?;

		Ok(UserResponse::new(&new_user, &owner.org.external_id, &simple))
	}

	#[tracing::instrument(skip(self))]
	pub async fn find_by_username(
		&self,
		org_external_id: &str,
		username: &str,
	) -> Result<UserResponse> {
		let mut tx = self.coordinator.begin().await?;
		let outcome = self.find_in(&mut tx, org_external_id, username).await;
		self.coordinator.finish(tx, outcome).await
	}

	async fn find_in(
		&self,
		conn: &mut SqliteConnection,
		org_external_id: &str,
		username: &str,
	) -> Result<UserResponse> {
		let owner = find_org_record(conn, org_external_id).await?;
		let record = user::find_user_by_username(conn, &owner.org.id, username.trim())
			.await?
			.ok_or_else(|| {
				ProvisioningError::NotExist(format!(
					"user {username} does not exist in org {org_external_id}"
				))
			})?;
		Ok(UserResponse::new(&record.user, &record.org_external_id, &record.audit))
	}
}
