// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use keel_core::{Audit, EntityFactory, OrgKind, SimpleAudit, GENESIS_KIND};
use keel_db::{expect_single_row, org_kind, Datastore};
use sqlx::SqliteConnection;

use crate::error::{ProvisioningError, Result};
use crate::request::CreateOrgKindRequest;
use crate::response::OrgKindResponse;
use crate::transaction::TransactionCoordinator;

/// Write an org kind and check the row count.
pub(crate) async fn create_org_kind_tx(
	conn: &mut SqliteConnection,
	kind: &OrgKind,
	audit: &SimpleAudit,
) -> Result<()> {
	let rows = org_kind::insert_org_kind(conn, kind, audit).await?;
	expect_single_row("CreateOrgKind", rows)?;
	Ok(())
}

/// Resolve a kind by tag.
pub(crate) async fn find_org_kind(conn: &mut SqliteConnection, external_id: &str) -> Result<OrgKind> {
	org_kind::find_org_kind_by_external_id(conn, external_id)
		.await?
		.ok_or_else(|| ProvisioningError::NotExist(format!("org kind {external_id} does not exist")))
}

/// Administrative management of org kinds.
#[derive(Clone)]
pub struct OrgKindService {
	coordinator: TransactionCoordinator,
	factory: EntityFactory,
}

impl OrgKindService {
	pub fn new(datastore: Arc<dyn Datastore>, factory: EntityFactory) -> Self {
		Self {
			coordinator: TransactionCoordinator::new(datastore),
			factory,
		}
	}

	/// Create a new kind. The `genesis` tag is reserved for the bootstrap.
	#[tracing::instrument(skip(self, request, audit), fields(org_kind = %request.external_id))]
	pub async fn create(
		&self,
		request: &CreateOrgKindRequest,
		audit: &Audit,
	) -> Result<OrgKindResponse> {
		request.validate()?;
		let tag = request.external_id.trim();
		if tag == GENESIS_KIND {
			return Err(ProvisioningError::Validation(format!(
				"org kind {GENESIS_KIND} is reserved"
			)));
		}

		let mut tx = self.coordinator.begin().await?;
		let outcome = self.create_in(&mut tx, tag, request, audit).await;
		let response = self.coordinator.finish(tx, outcome).await?;

		tracing::info!(org_kind = %response.external_id, "org kind created");
		Ok(response)
	}

	async fn create_in(
		&self,
		conn: &mut SqliteConnection,
		tag: &str,
		request: &CreateOrgKindRequest,
		audit: &Audit,
	) -> Result<OrgKindResponse> {
		if org_kind::find_org_kind_by_external_id(conn, tag)
			.await?
			.is_some()
		{
			return Err(ProvisioningError::Validation(format!(
				"org kind {tag} already exists"
			)));
		}

		let kind = self.factory.new_org_kind(tag, &request.description);
		let simple = SimpleAudit::new(audit.clone());
		create_org_kind_tx(conn, &kind, &simple).await?;

		Ok(OrgKindResponse::new(&kind, &simple))
	}

	#[tracing::instrument(skip(self))]
	pub async fn find_all(&self) -> Result<Vec<OrgKindResponse>> {
		let mut tx = self.coordinator.begin().await?;
		let outcome: Result<Vec<OrgKindResponse>> = org_kind::list_org_kinds(&mut tx)
			.await
			.map_err(ProvisioningError::from)
			.map(|records| {
				records
					.iter()
					.map(|r| OrgKindResponse::new(&r.kind, &r.audit))
					.collect()
			});
		self.coordinator.finish(tx, outcome).await
	}
}
