// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Org provisioning.
//!
//! An org is created together with an optional app and an optional user in
//! one transaction. Writes run parents first: org, app, API keys, person,
//! profile, user. Every write must touch exactly one row.

use std::sync::Arc;

use keel_core::{Audit, EntityFactory, Org, SimpleAudit};
use keel_db::{app as app_rows, expect_single_row, org, Datastore, OrgRecord};
use sqlx::SqliteConnection;

use crate::app::{create_app_tx, delete_app_tx};
use crate::error::{ProvisioningError, Result};
use crate::org_kind::find_org_kind;
use crate::request::{CreateOrgRequest, UpdateOrgRequest};
use crate::response::{AppResponse, DeleteResponse, OrgResponse, UserResponse};
use crate::transaction::TransactionCoordinator;
use crate::user::create_user_tx;

/// Write an org and check the row count.
pub(crate) async fn create_org_tx(
	conn: &mut SqliteConnection,
	org: &Org,
	audit: &SimpleAudit,
) -> Result<()> {
	let rows = org::insert_org(conn, org, audit).await?;
	expect_single_row("CreateOrg", rows)?;
	Ok(())
}

#[derive(Clone)]
pub struct OrgService {
	coordinator: TransactionCoordinator,
	factory: EntityFactory,
}

impl OrgService {
	pub fn new(datastore: Arc<dyn Datastore>, factory: EntityFactory) -> Self {
		Self {
			coordinator: TransactionCoordinator::new(datastore),
			factory,
		}
	}

	/// Create an org, plus the app and user bundled in the request.
	///
	/// # Errors
	/// - `Validation` if a required field is blank
	/// - `NotExist` if the requested kind is unknown
	/// - `Database` if a write fails or touches other than one row
	/// - `Internal` if API key material cannot be issued
	#[tracing::instrument(skip(self, request, audit), fields(name = %request.name, kind = %request.kind))]
	pub async fn create(&self, request: &CreateOrgRequest, audit: &Audit) -> Result<OrgResponse> {
		request.validate()?;

		let mut tx = self.coordinator.begin().await?;
		let outcome = self.create_in(&mut tx, request, audit).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(org_external_id = %response.external_id, "org created");
		Ok(response)
	}

	async fn create_in(
		&self,
		conn: &mut SqliteConnection,
		request: &CreateOrgRequest,
		audit: &Audit,
	) -> Result<OrgResponse> {
		let kind = find_org_kind(conn, &request.kind).await?;

		let org = self
			.factory
			.new_org(&request.name, &request.description, &kind);
		let app = match &request.app {
			Some(r) => Some(
				self.factory
					.new_app(&r.name, &r.description, &org, r.deactivation())?,
			),
			None => None,
		};
		let user = match &request.user {
			Some(r) => {
				let profile = self
					.factory
					.new_org_profile(&org, &r.first_name, &r.last_name);
				Some(self.factory.new_user(&r.username, &org, profile)?)
			}
			None => None,
		};

		let simple = SimpleAudit::new(audit.clone());
		create_org_tx(conn, &org, &simple).await?;
		if let Some(app) = &app {
			create_app_tx(conn, app, &simple).await?;
		}
		if let Some(user) = &user {
			create_user_tx(conn, user, &simple).await?;
		}

		let mut response = OrgResponse::new(&org, &simple);
		response.app = app
			.as_ref()
			.map(|a| AppResponse::new(a, &org.external_id, &simple));
		response.user = user
			.as_ref()
			.map(|u| UserResponse::new(u, &org.external_id, &simple));
		Ok(response)
	}

	/// Override name and description, keeping the create stamp.
	#[tracing::instrument(skip(self, request, audit), fields(org_external_id = %request.external_id))]
	pub async fn update(&self, request: &UpdateOrgRequest, audit: &Audit) -> Result<OrgResponse> {
		request.validate()?;

		let mut tx = self.coordinator.begin().await?;
		let outcome = self.update_in(&mut tx, request, audit).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(org_external_id = %response.external_id, "org updated");
		Ok(response)
	}

	async fn update_in(
		&self,
		conn: &mut SqliteConnection,
		request: &UpdateOrgRequest,
		audit: &Audit,
	) -> Result<OrgResponse> {
		let record = org::find_org_by_external_id(conn, &request.external_id)
			.await?
			.ok_or_else(|| {
				ProvisioningError::Validation("No org exists for the given external ID".to_string())
			})?;

		let mut org = record.org;
		if let Some(name) = &request.name {
			org.name = name.clone();
		}
		if let Some(description) = &request.description {
			org.description = description.clone();
		}

		let simple = record.audit.touch(audit.clone());
		let rows = org::update_org(conn, &org, &simple).await?;
		expect_single_row("UpdateOrg", rows)?;

		Ok(OrgResponse::new(&org, &simple))
	}

	/// Delete an org. Its apps and their keys go first. Users, persons and
	/// profiles are removed by cascade.
	#[tracing::instrument(skip(self))]
	pub async fn delete(&self, external_id: &str) -> Result<DeleteResponse> {
		let mut tx = self.coordinator.begin().await?;
		let outcome = self.delete_in(&mut tx, external_id).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(org_external_id = %external_id, "org deleted");
		Ok(response)
	}

	async fn delete_in(&self, conn: &mut SqliteConnection, external_id: &str) -> Result<DeleteResponse> {
		let record = find_org_record(conn, external_id).await?;

		let apps = app_rows::list_apps_for_org(conn, &record.org.id).await?;
		for app in &apps {
			delete_app_tx(conn, &app.id).await?;
		}

		let rows = org::delete_org(conn, &record.org.id).await?;
		expect_single_row("DeleteOrg", rows)?;

		Ok(DeleteResponse {
			external_id: record.org.external_id.to_string(),
			deleted: true,
		})
	}

	/// List every org, oldest first.
	#[tracing::instrument(skip(self))]
	pub async fn find_all(&self) -> Result<Vec<OrgResponse>> {
		let mut tx = self.coordinator.begin().await?;
		let outcome: Result<Vec<OrgResponse>> = org::list_orgs(&mut tx)
			.await
			.map_err(ProvisioningError::from)
			.map(|records| {
				records
					.iter()
					.map(|r| OrgResponse::new(&r.org, &r.audit))
					.collect()
			});
		self.coordinator.finish(tx, outcome).await
	}

	#[tracing::instrument(skip(self))]
	pub async fn find_by_external_id(&self, external_id: &str) -> Result<OrgResponse> {
		let mut tx = self.coordinator.begin().await?;
		let outcome = find_org_record(&mut tx, external_id)
			.await
			.map(|r| OrgResponse::new(&r.org, &r.audit));
		self.coordinator.finish(tx, outcome).await
	}
}

/// Resolve an org by external ID.
pub(crate) async fn find_org_record(
	conn: &mut SqliteConnection,
	external_id: &str,
) -> Result<OrgRecord> {
	org::find_org_by_external_id(conn, external_id)
		.await?
		.ok_or_else(|| ProvisioningError::NotExist(format!("org {external_id} does not exist")))
}
