// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-time bootstrap of the tenancy data.
//!
//! Seeding writes, in one transaction:
//! - the org kinds `genesis`, `test` and `standard`
//! - the genesis org, its app `WOPR` and the seed user
//! - a disposable test org, app and user
//!
//! Every row is stamped with a single audit whose actor is the genesis app
//! and user. A guard outside the transaction refuses to seed once a genesis
//! kind or org exists, and the unique constraint on kind tags stops two
//! bootstraps that race past the guard.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use keel_core::{
	App, Audit, Clock, EntityFactory, Org, OrgKind, SimpleAudit, User, GENESIS_KIND,
	STANDARD_KIND, TEST_KIND,
};
use keel_db::{org, org_kind, Datastore, DbError};
use sqlx::SqliteConnection;

use crate::app::create_app_tx;
use crate::error::{ProvisioningError, Result};
use crate::org::create_org_tx;
use crate::org_kind::create_org_kind_tx;
use crate::request::{default_key_deactivation, GenesisRequest};
use crate::response::{AppResponse, FullGenesisResponse, GenesisBundle, OrgResponse, UserResponse};
use crate::transaction::TransactionCoordinator;
use crate::user::create_user_tx;

const GENESIS_KIND_DESCRIPTION: &str = "The genesis org represents the first organization created in the database and exists purely for the administrative purpose of creating other organizations, apps and users.";
const TEST_KIND_DESCRIPTION: &str = "The test org is used strictly for testing";
const STANDARD_KIND_DESCRIPTION: &str = "The standard org is used for myriad business purposes";

const GENESIS_ORG_NAME: &str = "genesis";
const GENESIS_ORG_DESCRIPTION: &str = GENESIS_KIND_DESCRIPTION;
const GENESIS_APP_NAME: &str = "WOPR";
const GENESIS_APP_DESCRIPTION: &str = "App created as part of Genesis event. To be used solely for creating other apps, orgs and users.";

const TEST_ORG_NAME: &str = "test";
const TEST_ORG_DESCRIPTION: &str = "The test org is self explanatory";
const TEST_APP_NAME: &str = "test";
const TEST_APP_DESCRIPTION: &str = "The test app is self explanatory";

/// Progress of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenesisState {
	NotStarted,
	KindsSeeded,
	GenesisEntitiesWritten,
	TestEntitiesWritten,
	Committed,
	/// Rolled back; nothing persisted.
	Aborted,
}

impl fmt::Display for GenesisState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotStarted => write!(f, "not_started"),
			Self::KindsSeeded => write!(f, "kinds_seeded"),
			Self::GenesisEntitiesWritten => write!(f, "genesis_entities_written"),
			Self::TestEntitiesWritten => write!(f, "test_entities_written"),
			Self::Committed => write!(f, "committed"),
			Self::Aborted => write!(f, "aborted"),
		}
	}
}

struct Bundle {
	org: Org,
	app: App,
	user: User,
}

impl Bundle {
	fn response(&self, audit: &SimpleAudit) -> GenesisBundle {
		GenesisBundle {
			org: OrgResponse::new(&self.org, audit),
			app: AppResponse::new(&self.app, &self.org.external_id, audit),
			user: UserResponse::new(&self.user, &self.org.external_id, audit),
		}
	}
}

#[derive(Clone)]
pub struct GenesisService {
	datastore: Arc<dyn Datastore>,
	coordinator: TransactionCoordinator,
	factory: EntityFactory,
	clock: Arc<dyn Clock>,
}

impl GenesisService {
	pub fn new(datastore: Arc<dyn Datastore>, factory: EntityFactory, clock: Arc<dyn Clock>) -> Self {
		Self {
			coordinator: TransactionCoordinator::new(datastore.clone()),
			datastore,
			factory,
			clock,
		}
	}

	/// Seed the kind taxonomy and the genesis and test sets.
	///
	/// # Errors
	/// - `Validation` if any genesis data already exists; nothing is written
	/// - `Database` or `Internal` if a step fails; everything is rolled back
	#[tracing::instrument(skip(self, request), fields(seed_username = %request.seed_username))]
	pub async fn seed(&self, request: &GenesisRequest) -> Result<FullGenesisResponse> {
		request.validate()?;
		self.guard().await?;

		let mut state = GenesisState::NotStarted;
		let mut tx = self.coordinator.begin().await?;
		let outcome = self.seed_in(&mut tx, request, &mut state).await;

		match self.coordinator.finish(tx, outcome).await {
			Ok(response) => {
				tracing::info!(state = %GenesisState::Committed, "genesis committed");
				Ok(response)
			}
			Err(e) => {
				tracing::error!(
					state = %GenesisState::Aborted,
					last_state = %state,
					error = %e,
					"genesis aborted"
				);
				Err(e)
			}
		}
	}

	/// Refuse to run when a genesis kind or a genesis org already exists.
	async fn guard(&self) -> Result<()> {
		let mut conn = self
			.datastore
			.pool()
			.acquire()
			.await
			.map_err(DbError::from)?;

		let kind = org_kind::find_org_kind_by_external_id(&mut conn, GENESIS_KIND).await?;
		let orgs = org::count_orgs_with_kind(&mut conn, GENESIS_KIND).await?;
		if kind.is_some() || orgs > 0 {
			return Err(ProvisioningError::Validation(
				"No prior data should exist when executing the genesis service".to_string(),
			));
		}
		Ok(())
	}

	async fn seed_in(
		&self,
		conn: &mut SqliteConnection,
		request: &GenesisRequest,
		state: &mut GenesisState,
	) -> Result<FullGenesisResponse> {
		let moment = self.clock.now();
		let deactivation = default_key_deactivation();

		let genesis_kind = self
			.factory
			.new_org_kind(GENESIS_KIND, GENESIS_KIND_DESCRIPTION);
		let test_kind = self.factory.new_org_kind(TEST_KIND, TEST_KIND_DESCRIPTION);
		let standard_kind = self
			.factory
			.new_org_kind(STANDARD_KIND, STANDARD_KIND_DESCRIPTION);

		let genesis = self.build_bundle(
			&genesis_kind,
			(GENESIS_ORG_NAME, GENESIS_ORG_DESCRIPTION),
			(GENESIS_APP_NAME, GENESIS_APP_DESCRIPTION),
			request,
			deactivation,
		)?;
		let audit = SimpleAudit::new(Audit::new(&genesis.app, &genesis.user, moment));

		for kind in [&genesis_kind, &test_kind, &standard_kind] {
			create_org_kind_tx(conn, kind, &audit).await?;
		}
		advance(state, GenesisState::KindsSeeded);

		write_bundle(conn, &genesis, &audit).await?;
		advance(state, GenesisState::GenesisEntitiesWritten);

		let test = self.build_bundle(
			&test_kind,
			(TEST_ORG_NAME, TEST_ORG_DESCRIPTION),
			(TEST_APP_NAME, TEST_APP_DESCRIPTION),
			request,
			deactivation,
		)?;
		write_bundle(conn, &test, &audit).await?;
		advance(state, GenesisState::TestEntitiesWritten);

		Ok(FullGenesisResponse {
			genesis: genesis.response(&audit),
			test: test.response(&audit),
		})
	}

	fn build_bundle(
		&self,
		kind: &OrgKind,
		(org_name, org_description): (&str, &str),
		(app_name, app_description): (&str, &str),
		request: &GenesisRequest,
		deactivation: DateTime<Utc>,
	) -> Result<Bundle> {
		let org = self.factory.new_org(org_name, org_description, kind);
		let app = self
			.factory
			.new_app(app_name, app_description, &org, deactivation)?;
		let profile = self.factory.new_org_profile(
			&org,
			&request.seed_user_first_name,
			&request.seed_user_last_name,
		);
		let user = self
			.factory
			.new_user(&request.seed_username, &org, profile)?;
		Ok(Bundle { org, app, user })
	}
}

async fn write_bundle(conn: &mut SqliteConnection, bundle: &Bundle, audit: &SimpleAudit) -> Result<()> {
	create_org_tx(conn, &bundle.org, audit).await?;
	create_app_tx(conn, &bundle.app, audit).await?;
	create_user_tx(conn, &bundle.user, audit).await?;
	Ok(())
}

fn advance(state: &mut GenesisState, next: GenesisState) {
	tracing::info!(from = %state, to = %next, "genesis state");
	*state = next;
}
