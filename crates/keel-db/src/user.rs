// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row operations for `persons`, `person_profiles` and `users`.
//!
//! All three are removed by cascade when their org is deleted.

use keel_core::{ExternalId, OrgId, Person, Profile, SimpleAudit, User};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::audit::{
	bind_simple_audit, parse_external_id, parse_simple_audit, parse_uuid, AUDIT_JOINS, AUDIT_SELECT,
};
use crate::error::{conflict_on_unique, DbError};

/// A user with its org's external ID and provenance.
#[derive(Debug, Clone)]
pub struct UserRecord {
	pub user: User,
	pub org_external_id: ExternalId,
	pub audit: SimpleAudit,
}

#[tracing::instrument(skip(conn, person), fields(person_id = %person.id))]
pub async fn insert_person(conn: &mut SqliteConnection, person: &Person) -> Result<u64, DbError> {
	let result = sqlx::query("INSERT INTO persons (id, org_id) VALUES (?, ?)")
		.bind(person.id.to_string())
		.bind(person.org_id.to_string())
		.execute(&mut *conn)
		.await?;

	tracing::debug!(person_id = %person.id, org_id = %person.org_id, "person inserted");
	Ok(result.rows_affected())
}

#[tracing::instrument(skip(conn, profile, audit), fields(profile_id = %profile.id))]
pub async fn insert_profile(
	conn: &mut SqliteConnection,
	profile: &Profile,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		INSERT INTO person_profiles (
			id, person_id, first_name, last_name,
			create_app_id, create_user_id, create_timestamp,
			update_app_id, update_user_id, update_timestamp
		) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(profile.id.to_string())
	.bind(profile.person.id.to_string())
	.bind(&profile.first_name)
	.bind(&profile.last_name);

	let result = bind_simple_audit(query, audit).execute(&mut *conn).await?;

	tracing::debug!(profile_id = %profile.id, "profile inserted");
	Ok(result.rows_affected())
}

/// Insert a user.
///
/// # Errors
/// Returns `DbError::Conflict` if the username is taken within the org.
#[tracing::instrument(skip(conn, user, audit), fields(username = %user.username, org_id = %user.org_id))]
pub async fn insert_user(
	conn: &mut SqliteConnection,
	user: &User,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		INSERT INTO users (
			id, username, org_id, profile_id,
			create_app_id, create_user_id, create_timestamp,
			update_app_id, update_user_id, update_timestamp
		) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(user.id.to_string())
	.bind(&user.username)
	.bind(user.org_id.to_string())
	.bind(user.profile.id.to_string());

	let result = bind_simple_audit(query, audit)
		.execute(&mut *conn)
		.await
		.map_err(|e| conflict_on_unique(e, || format!("username {} already exists in org", user.username)))?;

	tracing::debug!(username = %user.username, org_id = %user.org_id, "user inserted");
	Ok(result.rows_affected())
}

/// Look up a user by username within an org.
#[tracing::instrument(skip(conn), fields(org_id = %org_id))]
pub async fn find_user_by_username(
	conn: &mut SqliteConnection,
	org_id: &OrgId,
	username: &str,
) -> Result<Option<UserRecord>, DbError> {
	let sql = format!(
		r#"
		SELECT t.id, t.username, t.org_id, o.external_id AS org_external_id,
			t.profile_id, p.first_name, p.last_name, p.person_id,
			{AUDIT_SELECT}
		FROM users t
		JOIN orgs o ON o.id = t.org_id
		JOIN person_profiles p ON p.id = t.profile_id
		{AUDIT_JOINS}
		WHERE t.org_id = ? AND t.username = ?
		"#
	);
	let row = sqlx::query(&sql)
		.bind(org_id.to_string())
		.bind(username)
		.fetch_optional(&mut *conn)
		.await?;

	row.map(|r| parse_user_record(&r)).transpose()
}

fn parse_user_record(row: &SqliteRow) -> Result<UserRecord, DbError> {
	let id: String = row.get("id");
	let org_id: String = row.get("org_id");
	let org_external_id: String = row.get("org_external_id");
	let profile_id: String = row.get("profile_id");
	let person_id: String = row.get("person_id");

	let org_id: OrgId = parse_uuid(&org_id, "org_id")?.into();

	Ok(UserRecord {
		user: User {
			id: parse_uuid(&id, "user_id")?.into(),
			username: row.get("username"),
			org_id,
			profile: Profile {
				id: parse_uuid(&profile_id, "profile_id")?.into(),
				person: Person {
					id: parse_uuid(&person_id, "person_id")?.into(),
					org_id,
				},
				first_name: row.get("first_name"),
				last_name: row.get("last_name"),
			},
		},
		org_external_id: parse_external_id(&org_external_id)?,
		audit: parse_simple_audit(row)?,
	})
}
