// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{count, harness, seeded};
use keel_db::SqliteDatastore;
use keel_provisioning::{
	CreateAppRequest, CreateOrgKindRequest, CreateUserRequest, ErrorKind, PingService,
	UpdateAppRequest,
};

fn app_request(org_external_id: &str) -> CreateAppRequest {
	CreateAppRequest {
		org_external_id: org_external_id.to_string(),
		name: "ledger".to_string(),
		description: "Bookkeeping".to_string(),
		api_key_deactivation: Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
	}
}

#[tokio::test]
async fn app_is_created_with_one_key() {
	let (h, seeded, audit) = seeded().await;

	let app = h
		.apps
		.create(&app_request(&seeded.test.org.external_id), &audit)
		.await
		.unwrap();
	assert_eq!(app.org_external_id, seeded.test.org.external_id);
	assert_eq!(app.api_keys.len(), 1);
	assert_eq!(app.api_keys[0].deactivation_date, "2030-01-01T00:00:00Z");
	assert!(!app.api_keys[0].key.is_empty());

	let found = h.apps.find_by_external_id(&app.external_id).await.unwrap();
	assert_eq!(found, app);
}

#[tokio::test]
async fn app_in_missing_org_is_not_exist() {
	let (h, _, audit) = seeded().await;
	let err = h
		.apps
		.create(&app_request("no-such-org"), &audit)
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotExist);
	assert_eq!(count(&h.pool, "apps").await, 2);
}

#[tokio::test]
async fn added_keys_are_kept_alongside_the_first() {
	let (h, seeded, audit) = seeded().await;
	let app = h
		.apps
		.create(&app_request(&seeded.test.org.external_id), &audit)
		.await
		.unwrap();

	let later = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
	let rotated = h
		.apps
		.add_api_key(&app.external_id, later, &audit)
		.await
		.unwrap();
	assert_eq!(rotated.api_keys.len(), 2);
	assert_ne!(rotated.api_keys[0].key, rotated.api_keys[1].key);

	let found = h.apps.find_by_external_id(&app.external_id).await.unwrap();
	let mut stored: Vec<_> = found.api_keys.iter().map(|k| k.key.clone()).collect();
	let mut issued: Vec<_> = rotated.api_keys.iter().map(|k| k.key.clone()).collect();
	stored.sort();
	issued.sort();
	assert_eq!(stored, issued);
}

#[tokio::test]
async fn added_key_moves_the_app_update_stamp() {
	let (h, seeded, audit) = seeded().await;
	let app = h
		.apps
		.create(&app_request(&seeded.test.org.external_id), &audit)
		.await
		.unwrap();

	let rotator = h
		.audits
		.stamp(&seeded.test.app.external_id, "root")
		.await
		.unwrap();
	let later = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
	let rotated = h
		.apps
		.add_api_key(&app.external_id, later, &rotator)
		.await
		.unwrap();

	assert_eq!(
		rotated.audit.create_app_external_id,
		seeded.genesis.app.external_id
	);
	assert_eq!(rotated.audit.update_app_external_id, seeded.test.app.external_id);

	let found = h.apps.find_by_external_id(&app.external_id).await.unwrap();
	assert_eq!(found.audit, rotated.audit);
}

#[tokio::test]
async fn app_update_and_delete() {
	let (h, seeded, audit) = seeded().await;
	let app = h
		.apps
		.create(&app_request(&seeded.test.org.external_id), &audit)
		.await
		.unwrap();

	let updated = h
		.apps
		.update(
			&UpdateAppRequest {
				external_id: app.external_id.clone(),
				name: None,
				description: Some("General ledger".to_string()),
			},
			&audit,
		)
		.await
		.unwrap();
	assert_eq!(updated.name, "ledger");
	assert_eq!(updated.description, "General ledger");
	assert_eq!(updated.api_keys.len(), 1);

	let deleted = h.apps.delete(&app.external_id).await.unwrap();
	assert!(deleted.deleted);
	let err = h.apps.find_by_external_id(&app.external_id).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotExist);
	assert_eq!(count(&h.pool, "app_api_keys").await, 2);
}

#[tokio::test]
async fn user_is_created_and_found() {
	let (h, seeded, audit) = seeded().await;
	let request = CreateUserRequest {
		org_external_id: seeded.test.org.external_id.clone(),
		username: " grace ".to_string(),
		first_name: "Grace".to_string(),
		last_name: "Hopper".to_string(),
	};

	let user = h.users.create(&request, &audit).await.unwrap();
	assert_eq!(user.username, "grace");
	assert_eq!(user.audit.create_username, "root");

	let found = h
		.users
		.find_by_username(&seeded.test.org.external_id, "grace")
		.await
		.unwrap();
	assert_eq!(found, user);

	let err = h.users.create(&request, &audit).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Validation);
	assert_eq!(count(&h.pool, "users").await, 3);
}

#[tokio::test]
async fn same_username_may_exist_in_different_orgs() {
	let (h, seeded, _) = seeded().await;
	let genesis = h
		.users
		.find_by_username(&seeded.genesis.org.external_id, "root")
		.await
		.unwrap();
	let test = h
		.users
		.find_by_username(&seeded.test.org.external_id, "root")
		.await
		.unwrap();
	assert_ne!(genesis.org_external_id, test.org_external_id);

	let err = h
		.users
		.find_by_username(&seeded.test.org.external_id, "nobody")
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotExist);
}

#[tokio::test]
async fn kinds_can_be_added_but_genesis_is_reserved() {
	let (h, _, audit) = seeded().await;

	let partner = h
		.kinds
		.create(
			&CreateOrgKindRequest {
				external_id: "partner".to_string(),
				description: "Partner orgs".to_string(),
			},
			&audit,
		)
		.await
		.unwrap();
	assert_eq!(partner.external_id, "partner");
	assert_eq!(h.kinds.find_all().await.unwrap().len(), 4);

	let duplicate = h
		.kinds
		.create(
			&CreateOrgKindRequest {
				external_id: "standard".to_string(),
				description: "again".to_string(),
			},
			&audit,
		)
		.await
		.unwrap_err();
	assert_eq!(duplicate.kind(), ErrorKind::Validation);

	let reserved = h
		.kinds
		.create(
			&CreateOrgKindRequest {
				external_id: "genesis".to_string(),
				description: "second genesis".to_string(),
			},
			&audit,
		)
		.await
		.unwrap_err();
	assert_eq!(reserved.kind(), ErrorKind::Validation);
	assert_eq!(count(&h.pool, "org_kinds").await, 4);
}

#[tokio::test]
async fn audit_requires_a_known_app_and_user() {
	let (h, seeded, _) = seeded().await;

	let audit = h
		.audits
		.stamp(&seeded.test.app.external_id, "root")
		.await
		.unwrap();
	assert_eq!(audit.app().external_id.as_str(), seeded.test.app.external_id);
	assert_eq!(audit.user().first_name, "Ada");
	assert_eq!(audit.moment(), common::moment());

	let err = h.audits.stamp("no-such-app", "root").await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotExist);
	let err = h
		.audits
		.stamp(&seeded.test.app.external_id, "nobody")
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotExist);
}

#[tokio::test]
async fn ping_reports_store_health() {
	let h = harness().await;
	let ping = PingService::new(Arc::new(SqliteDatastore::new(h.pool.clone())));
	assert!(ping.ping().await.db_up);

	h.pool.close().await;
	assert!(!ping.ping().await.db_up);
}
