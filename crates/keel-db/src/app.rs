// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row operations for the `apps` and `app_api_keys` tables.
//!
//! API keys are stored only in sealed form. [`AppRecord::open`] turns a
//! record back into an [`App`] by decrypting its keys.

use chrono::{DateTime, Utc};
use keel_core::{ApiKey, App, AppId, EncryptionKey, ExternalId, OrgId, SecureError, SimpleAudit};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::audit::{
	bind_audit, bind_simple_audit, parse_external_id, parse_simple_audit, parse_timestamp,
	parse_uuid, AUDIT_JOINS, AUDIT_SELECT,
};
use crate::error::DbError;

/// An API key as stored: sealed material and its deactivation moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredApiKey {
	pub ciphertext: String,
	pub deactivation: DateTime<Utc>,
}

/// An app with its owning org's external ID, sealed keys and provenance.
#[derive(Debug, Clone)]
pub struct AppRecord {
	pub id: AppId,
	pub external_id: ExternalId,
	pub org_id: OrgId,
	pub org_external_id: ExternalId,
	pub name: String,
	pub description: String,
	pub api_keys: Vec<StoredApiKey>,
	pub audit: SimpleAudit,
}

impl AppRecord {
	/// Decrypt the stored keys and rebuild the app.
	pub fn open(&self, encryption_key: &EncryptionKey) -> Result<App, SecureError> {
		let api_keys = self
			.api_keys
			.iter()
			.map(|k| ApiKey::from_ciphertext(&k.ciphertext, encryption_key, k.deactivation))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(App {
			id: self.id,
			external_id: self.external_id.clone(),
			org_id: self.org_id,
			name: self.name.clone(),
			description: self.description.clone(),
			api_keys,
		})
	}
}

#[tracing::instrument(skip(conn, app, audit), fields(app_external_id = %app.external_id))]
pub async fn insert_app(
	conn: &mut SqliteConnection,
	app: &App,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		INSERT INTO apps (
			id, external_id, org_id, name, description,
			create_app_id, create_user_id, create_timestamp,
			update_app_id, update_user_id, update_timestamp
		) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(app.id.to_string())
	.bind(app.external_id.as_str())
	.bind(app.org_id.to_string())
	.bind(&app.name)
	.bind(&app.description);

	let result = bind_simple_audit(query, audit).execute(&mut *conn).await?;

	tracing::debug!(app_external_id = %app.external_id, org_id = %app.org_id, "app inserted");
	Ok(result.rows_affected())
}

/// Insert one sealed key for an app. The plaintext is never written.
#[tracing::instrument(skip(conn, key, audit), fields(app_id = %app_id))]
pub async fn insert_api_key(
	conn: &mut SqliteConnection,
	app_id: &AppId,
	key: &ApiKey,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		INSERT INTO app_api_keys (
			ciphertext, app_id, deactivation_timestamp,
			create_app_id, create_user_id, create_timestamp,
			update_app_id, update_user_id, update_timestamp
		) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(key.ciphertext())
	.bind(app_id.to_string())
	.bind(key.deactivation().to_rfc3339());

	let result = bind_simple_audit(query, audit).execute(&mut *conn).await?;

	tracing::debug!(app_id = %app_id, deactivation = %key.deactivation(), "api key inserted");
	Ok(result.rows_affected())
}

/// Write name, description and the update stamp.
#[tracing::instrument(skip(conn, app, audit), fields(app_external_id = %app.external_id))]
pub async fn update_app(
	conn: &mut SqliteConnection,
	app: &App,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		UPDATE apps
		SET name = ?, description = ?,
			update_app_id = ?, update_user_id = ?, update_timestamp = ?
		WHERE id = ?
		"#,
	)
	.bind(&app.name)
	.bind(&app.description);

	let result = bind_audit(query, audit.update())
		.bind(app.id.to_string())
		.execute(&mut *conn)
		.await?;

	tracing::debug!(app_external_id = %app.external_id, "app updated");
	Ok(result.rows_affected())
}

/// Delete every key of an app. Returns how many were removed.
#[tracing::instrument(skip(conn), fields(app_id = %app_id))]
pub async fn delete_api_keys(conn: &mut SqliteConnection, app_id: &AppId) -> Result<u64, DbError> {
	let result = sqlx::query("DELETE FROM app_api_keys WHERE app_id = ?")
		.bind(app_id.to_string())
		.execute(&mut *conn)
		.await?;

	tracing::debug!(app_id = %app_id, rows = result.rows_affected(), "api keys deleted");
	Ok(result.rows_affected())
}

#[tracing::instrument(skip(conn), fields(app_id = %id))]
pub async fn delete_app(conn: &mut SqliteConnection, id: &AppId) -> Result<u64, DbError> {
	let result = sqlx::query("DELETE FROM apps WHERE id = ?")
		.bind(id.to_string())
		.execute(&mut *conn)
		.await?;

	tracing::debug!(app_id = %id, rows = result.rows_affected(), "app deleted");
	Ok(result.rows_affected())
}

fn select_apps(filter: &str) -> String {
	format!(
		r#"
		SELECT t.id, t.external_id, t.org_id, o.external_id AS org_external_id,
			t.name, t.description,
			{AUDIT_SELECT}
		FROM apps t
		JOIN orgs o ON o.id = t.org_id
		{AUDIT_JOINS}
		{filter}
		"#
	)
}

#[tracing::instrument(skip(conn))]
pub async fn find_app_by_external_id(
	conn: &mut SqliteConnection,
	external_id: &str,
) -> Result<Option<AppRecord>, DbError> {
	let sql = select_apps("WHERE t.external_id = ?");
	let row = sqlx::query(&sql)
		.bind(external_id)
		.fetch_optional(&mut *conn)
		.await?;

	match row {
		Some(row) => {
			let mut record = parse_app_row(&row)?;
			record.api_keys = list_api_keys(conn, &record.id).await?;
			Ok(Some(record))
		}
		None => Ok(None),
	}
}

/// List the apps owned by an org, oldest first.
#[tracing::instrument(skip(conn), fields(org_id = %org_id))]
pub async fn list_apps_for_org(
	conn: &mut SqliteConnection,
	org_id: &OrgId,
) -> Result<Vec<AppRecord>, DbError> {
	let sql = select_apps("WHERE t.org_id = ? ORDER BY t.create_timestamp, t.external_id");
	let rows = sqlx::query(&sql)
		.bind(org_id.to_string())
		.fetch_all(&mut *conn)
		.await?;

	let mut records = Vec::with_capacity(rows.len());
	for row in &rows {
		let mut record = parse_app_row(row)?;
		record.api_keys = list_api_keys(conn, &record.id).await?;
		records.push(record);
	}
	Ok(records)
}

/// Sealed keys of an app, earliest deactivation first.
#[tracing::instrument(skip(conn), fields(app_id = %app_id))]
pub async fn list_api_keys(
	conn: &mut SqliteConnection,
	app_id: &AppId,
) -> Result<Vec<StoredApiKey>, DbError> {
	let rows = sqlx::query(
		r#"
		SELECT ciphertext, deactivation_timestamp
		FROM app_api_keys
		WHERE app_id = ?
		ORDER BY deactivation_timestamp, create_timestamp
		"#,
	)
	.bind(app_id.to_string())
	.fetch_all(&mut *conn)
	.await?;

	rows
		.iter()
		.map(|r| {
			let deactivation: String = r.get("deactivation_timestamp");
			Ok(StoredApiKey {
				ciphertext: r.get("ciphertext"),
				deactivation: parse_timestamp(&deactivation)?,
			})
		})
		.collect()
}

fn parse_app_row(row: &SqliteRow) -> Result<AppRecord, DbError> {
	let id: String = row.get("id");
	let external_id: String = row.get("external_id");
	let org_id: String = row.get("org_id");
	let org_external_id: String = row.get("org_external_id");

	Ok(AppRecord {
		id: parse_uuid(&id, "app_id")?.into(),
		external_id: parse_external_id(&external_id)?,
		org_id: parse_uuid(&org_id, "org_id")?.into(),
		org_external_id: parse_external_id(&org_external_id)?,
		name: row.get("name"),
		description: row.get("description"),
		api_keys: Vec::new(),
		audit: parse_simple_audit(row)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{far_future, seed_actor, test_pool};

	#[tokio::test]
	async fn app_and_keys_roundtrip_through_encryption() {
		let pool = test_pool().await;
		let mut conn = pool.acquire().await.unwrap();
		let actor = seed_actor(&mut conn).await;

		let org = actor.factory.new_org("Acme", "Acme Corp", &actor.kind);
		crate::org::insert_org(&mut conn, &org, &actor.audit)
			.await
			.unwrap();
		let app = actor
			.factory
			.new_app("portal", "customer portal", &org, far_future())
			.unwrap();
		assert_eq!(insert_app(&mut conn, &app, &actor.audit).await.unwrap(), 1);
		assert_eq!(
			insert_api_key(&mut conn, &app.id, &app.api_keys[0], &actor.audit)
				.await
				.unwrap(),
			1
		);

		let record = find_app_by_external_id(&mut conn, app.external_id.as_str())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(record.org_external_id, org.external_id);
		assert_eq!(record.api_keys.len(), 1);
		assert_ne!(record.api_keys[0].ciphertext, app.api_keys[0].key().expose());

		let opened = record.open(actor.factory.encryption_key()).unwrap();
		assert_eq!(
			opened.api_keys[0].key().expose(),
			app.api_keys[0].key().expose()
		);
	}

	#[tokio::test]
	async fn apps_are_listed_per_org() {
		let pool = test_pool().await;
		let mut conn = pool.acquire().await.unwrap();
		let actor = seed_actor(&mut conn).await;

		let listed = list_apps_for_org(&mut conn, &actor.org.id).await.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].external_id, actor.app.external_id);

		let other = actor.factory.new_org("Other", "no apps", &actor.kind);
		crate::org::insert_org(&mut conn, &other, &actor.audit)
			.await
			.unwrap();
		assert!(list_apps_for_org(&mut conn, &other.id)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn app_cannot_be_deleted_before_its_keys() {
		let pool = test_pool().await;
		let mut conn = pool.acquire().await.unwrap();
		let actor = seed_actor(&mut conn).await;

		let org = actor.factory.new_org("Acme", "Acme Corp", &actor.kind);
		crate::org::insert_org(&mut conn, &org, &actor.audit)
			.await
			.unwrap();
		let app = actor
			.factory
			.new_app("portal", "customer portal", &org, far_future())
			.unwrap();
		insert_app(&mut conn, &app, &actor.audit).await.unwrap();
		insert_api_key(&mut conn, &app.id, &app.api_keys[0], &actor.audit)
			.await
			.unwrap();

		assert!(delete_app(&mut conn, &app.id).await.is_err());
		assert_eq!(delete_api_keys(&mut conn, &app.id).await.unwrap(), 1);
		assert_eq!(delete_app(&mut conn, &app.id).await.unwrap(), 1);
	}
}
