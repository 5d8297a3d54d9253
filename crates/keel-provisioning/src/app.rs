// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::{DateTime, Utc};
use keel_core::{App, AppId, Audit, EntityFactory, SimpleAudit};
use keel_db::{app, expect_single_row, AppRecord, Datastore};
use sqlx::SqliteConnection;

use crate::error::{ProvisioningError, Result};
use crate::org::find_org_record;
use crate::request::{CreateAppRequest, UpdateAppRequest};
use crate::response::{AppResponse, DeleteResponse};
use crate::transaction::TransactionCoordinator;

/// Write an app followed by each of its keys, checking every row count.
pub(crate) async fn create_app_tx(
	conn: &mut SqliteConnection,
	app: &App,
	audit: &SimpleAudit,
) -> Result<()> {
	let rows = app::insert_app(conn, app, audit).await?;
	expect_single_row("CreateApp", rows)?;

	for key in &app.api_keys {
		let rows = app::insert_api_key(conn, &app.id, key, audit).await?;
		expect_single_row("CreateAppAPIKey", rows)?;
	}
	Ok(())
}

/// Delete an app's keys, then the app.
pub(crate) async fn delete_app_tx(conn: &mut SqliteConnection, app_id: &AppId) -> Result<()> {
	app::delete_api_keys(conn, app_id).await?;
	let rows = app::delete_app(conn, app_id).await?;
	expect_single_row("DeleteApp", rows)?;
	Ok(())
}

async fn find_app_record(conn: &mut SqliteConnection, external_id: &str) -> Result<AppRecord> {
	app::find_app_by_external_id(conn, external_id)
		.await?
		.ok_or_else(|| ProvisioningError::NotExist(format!("app {external_id} does not exist")))
}

/// Provisioning of apps under existing orgs.
#[derive(Clone)]
pub struct AppService {
	coordinator: TransactionCoordinator,
	factory: EntityFactory,
}

impl AppService {
	pub fn new(datastore: Arc<dyn Datastore>, factory: EntityFactory) -> Self {
		Self {
			coordinator: TransactionCoordinator::new(datastore),
			factory,
		}
	}

	/// Create an app, with one API key, in an existing org.
	#[tracing::instrument(skip(self, request, audit), fields(org_external_id = %request.org_external_id))]
	pub async fn create(&self, request: &CreateAppRequest, audit: &Audit) -> Result<AppResponse> {
		request.validate()?;

		let mut tx = self.coordinator.begin().await?;
		let outcome = self.create_in(&mut tx, request, audit).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(app_external_id = %response.external_id, "app created");
		Ok(response)
	}

	async fn create_in(
		&self,
		conn: &mut SqliteConnection,
		request: &CreateAppRequest,
		audit: &Audit,
	) -> Result<AppResponse> {
		let owner = find_org_record(conn, &request.org_external_id).await?;

		let app = self.factory.new_app(
			&request.name,
			&request.description,
			&owner.org,
			request.deactivation(),
		)?;
		let simple = SimpleAudit::new(audit.clone());
		create_app_tx(conn, &app, &simple).await?;

		Ok(AppResponse::new(&app, &owner.org.external_id, &simple))
	}

	#[tracing::instrument(skip(self, request, audit), fields(app_external_id = %request.external_id))]
	pub async fn update(&self, request: &UpdateAppRequest, audit: &Audit) -> Result<AppResponse> {
		request.validate()?;

		let mut tx = self.coordinator.begin().await?;
		let outcome = self.update_in(&mut tx, request, audit).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(app_external_id = %response.external_id, "app updated");
		Ok(response)
	}

	async fn update_in(
		&self,
		conn: &mut SqliteConnection,
		request: &UpdateAppRequest,
		audit: &Audit,
	) -> Result<AppResponse> {
		let record = find_app_record(conn, &request.external_id).await?;
		let mut app = record.open(self.factory.encryption_key())?;
		if let Some(name) = &request.name {
			app.name = name.clone();
		}
		if let Some(description) = &request.description {
			app.description = description.clone();
		}

		let simple = record.audit.clone().touch(audit.clone());
		let rows = app::update_app(conn, &app, &simple).await?;
		expect_single_row("UpdateApp", rows)?;

		Ok(AppResponse::new(&app, &record.org_external_id, &simple))
	}

	/// Issue an additional key for an app, for rotation.
	#[tracing::instrument(skip(self, audit), fields(app_external_id = %app_external_id))]
	pub async fn add_api_key(
		&self,
		app_external_id: &str,
		deactivation: DateTime<Utc>,
		audit: &Audit,
	) -> Result<AppResponse> {
		let mut tx = self.coordinator.begin().await?;
		let outcome = self
			.add_api_key_in(&mut tx, app_external_id, deactivation, audit)
			.await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(app_external_id = %app_external_id, keys = response.api_keys.len(), "api key added");
		Ok(response)
	}

	async fn add_api_key_in(
		&self,
		conn: &mut SqliteConnection,
		app_external_id: &str,
		deactivation: DateTime<Utc>,
		audit: &Audit,
	) -> Result<AppResponse> {
		let record = find_app_record(conn, app_external_id).await?;
		let mut app = record.open(self.factory.encryption_key())?;

		let key = self.factory.new_api_key(deactivation)?;
		let rows = app::insert_api_key(conn, &app.id, &key, &SimpleAudit::new(audit.clone())).await?;
		expect_single_row("CreateAppAPIKey", rows)?;
		app.api_keys.push(key);

		let simple = record.audit.clone().touch(audit.clone());
		let rows = app::update_app(conn, &app, &simple).await?;
		expect_single_row("UpdateApp", rows)?;

		Ok(AppResponse::new(&app, &record.org_external_id, &simple))
	}

	/// Look up an app; its keys are returned decrypted.
	#[tracing::instrument(skip(self))]
	pub async fn find_by_external_id(&self, external_id: &str) -> Result<AppResponse> {
		let mut tx = self.coordinator.begin().await?;
		let outcome = self.find_in(&mut tx, external_id).await;
		self.coordinator.finish(tx, outcome).await
	}

	async fn find_in(&self, conn: &mut SqliteConnection, external_id: &str) -> Result<AppResponse> {
		let record = find_app_record(conn, external_id).await?;
		let app = record.open(self.factory.encryption_key())?;
		Ok(AppResponse::new(&app, &record.org_external_id, &record.audit))
	}

	#[tracing::instrument(skip(self))]
	pub async fn delete(&self, external_id: &str) -> Result<DeleteResponse> {
		let mut tx = self.coordinator.begin().await?;
		let outcome = self.delete_in(&mut tx, external_id).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(app_external_id = %external_id, "app deleted");
		Ok(response)
	}

	async fn delete_in(&self, conn: &mut SqliteConnection, external_id: &str) -> Result<DeleteResponse> {
		let record = find_app_record(conn, external_id).await?;
		delete_app_tx(conn, &record.id).await?;
		Ok(DeleteResponse {
			external_id: record.external_id.to_string(),
			deleted: true,
		})
	}
}
