// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use keel_core::{
	App, Audit, EncryptionKey, EntityFactory, Org, OrgKind, OsRandom, SimpleAudit, User,
};
use sqlx::{sqlite::SqlitePool, Connection, SqliteConnection};

use crate::app::{insert_api_key, insert_app};
use crate::org::insert_org;
use crate::org_kind::insert_org_kind;
use crate::pool::create_memory_pool;
use crate::user::{insert_person, insert_profile, insert_user};

/// A self-stamped org, app and user that other fixtures can use as the
/// acting audit.
pub(crate) struct Actor {
	pub factory: EntityFactory,
	pub kind: OrgKind,
	pub org: Org,
	pub app: App,
	pub user: User,
	pub audit: SimpleAudit,
}

pub(crate) async fn test_pool() -> SqlitePool {
	create_memory_pool().await.unwrap()
}

pub(crate) fn far_future() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0).unwrap()
}

pub(crate) async fn seed_actor(conn: &mut SqliteConnection) -> Actor {
	let factory = EntityFactory::new(Arc::new(OsRandom), Arc::new(EncryptionKey::generate()));
	let kind = factory.new_org_kind("fixture", "fixture kind");
	let org = factory.new_org("fixture", "fixture org", &kind);
	let app = factory
		.new_app("fixture", "fixture app", &org, far_future())
		.unwrap();
	let profile = factory.new_org_profile(&org, "Ada", "Lovelace");
	let user = factory.new_user("root", &org, profile).unwrap();
	let audit = SimpleAudit::new(Audit::new(&app, &user, Utc::now()));

	let mut tx = conn.begin().await.unwrap();
	insert_org_kind(&mut tx, &kind, &audit).await.unwrap();
	insert_org(&mut tx, &org, &audit).await.unwrap();
	insert_app(&mut tx, &app, &audit).await.unwrap();
	insert_api_key(&mut tx, &app.id, &app.api_keys[0], &audit)
		.await
		.unwrap();
	insert_person(&mut tx, &user.profile.person).await.unwrap();
	insert_profile(&mut tx, &user.profile, &audit).await.unwrap();
	insert_user(&mut tx, &user, &audit).await.unwrap();
	tx.commit().await.unwrap();

	Actor {
		factory,
		kind,
		org,
		app,
		user,
		audit,
	}
}
