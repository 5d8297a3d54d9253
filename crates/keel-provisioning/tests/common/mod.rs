// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use keel_core::{
	AppId, Audit, AuditApp, AuditUser, EncryptionKey, EntityFactory, ExternalId, FixedClock,
	OsRandom, UserId,
};
use keel_db::{create_memory_pool, Datastore, SqliteDatastore};
use keel_provisioning::{
	AppService, AuditService, FullGenesisResponse, GenesisRequest, GenesisService, OrgKindService,
	OrgService, UserService,
};
use sqlx::SqlitePool;

pub struct Harness {
	pub pool: SqlitePool,
	pub orgs: OrgService,
	pub apps: AppService,
	pub users: UserService,
	pub kinds: OrgKindService,
	pub genesis: GenesisService,
	pub audits: AuditService,
}

pub fn moment() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub async fn harness() -> Harness {
	let pool = create_memory_pool().await.unwrap();
	let datastore: Arc<dyn Datastore> = Arc::new(SqliteDatastore::new(pool.clone()));
	let factory = EntityFactory::new(Arc::new(OsRandom), Arc::new(EncryptionKey::generate()));
	let clock = Arc::new(FixedClock::new(moment()));

	Harness {
		orgs: OrgService::new(datastore.clone(), factory.clone()),
		apps: AppService::new(datastore.clone(), factory.clone()),
		users: UserService::new(datastore.clone(), factory.clone()),
		kinds: OrgKindService::new(datastore.clone(), factory.clone()),
		genesis: GenesisService::new(datastore.clone(), factory, clock.clone()),
		audits: AuditService::new(datastore, clock),
		pool,
	}
}

pub fn seed_request() -> GenesisRequest {
	GenesisRequest {
		seed_username: "root".to_string(),
		seed_user_first_name: "Ada".to_string(),
		seed_user_last_name: "Lovelace".to_string(),
	}
}

/// A seeded store and an audit acting as the genesis app and seed user.
pub async fn seeded() -> (Harness, FullGenesisResponse, Audit) {
	let h = harness().await;
	let seeded = h.genesis.seed(&seed_request()).await.unwrap();
	let audit = h
		.audits
		.stamp(&seeded.genesis.app.external_id, "root")
		.await
		.unwrap();
	(h, seeded, audit)
}

/// An audit naming an app and user that were never written.
pub fn detached_audit() -> Audit {
	Audit::from_parts(
		AuditApp {
			id: AppId::generate(),
			external_id: ExternalId::generate(),
		},
		AuditUser {
			id: UserId::generate(),
			username: "nobody".to_string(),
			first_name: "No".to_string(),
			last_name: "Body".to_string(),
		},
		moment(),
	)
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
	sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
		.fetch_one(pool)
		.await
		.unwrap()
}

pub async fn counts(pool: &SqlitePool) -> Vec<i64> {
	let mut all = Vec::new();
	for table in [
		"org_kinds",
		"orgs",
		"apps",
		"app_api_keys",
		"persons",
		"person_profiles",
		"users",
	] {
		all.push(count(pool, table).await);
	}
	all
}

pub async fn exec(pool: &SqlitePool, sql: &str) {
	sqlx::query(sql).execute(pool).await.unwrap();
}
