// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row operations for the `orgs` table.
//!
//! Writes return the number of rows affected and leave the single-row check
//! to the caller. Lookups return `None` when nothing matches.

use keel_core::{Org, OrgId, SimpleAudit};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::audit::{
	bind_audit, bind_simple_audit, parse_external_id, parse_simple_audit, parse_uuid, AUDIT_JOINS,
	AUDIT_SELECT,
};
use crate::error::DbError;
use crate::org_kind::parse_org_kind;

/// An org with its provenance.
#[derive(Debug, Clone)]
pub struct OrgRecord {
	pub org: Org,
	pub audit: SimpleAudit,
}

#[tracing::instrument(skip(conn, org, audit), fields(org_external_id = %org.external_id))]
pub async fn insert_org(
	conn: &mut SqliteConnection,
	org: &Org,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		INSERT INTO orgs (
			id, external_id, name, description, kind_id,
			create_app_id, create_user_id, create_timestamp,
			update_app_id, update_user_id, update_timestamp
		) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(org.id.to_string())
	.bind(org.external_id.as_str())
	.bind(&org.name)
	.bind(&org.description)
	.bind(org.kind.id.to_string());

	let result = bind_simple_audit(query, audit).execute(&mut *conn).await?;

	tracing::debug!(org_external_id = %org.external_id, kind = %org.kind.external_id, "org inserted");
	Ok(result.rows_affected())
}

/// Write name, description and the update stamp. Create columns are never
/// touched.
#[tracing::instrument(skip(conn, org, audit), fields(org_external_id = %org.external_id))]
pub async fn update_org(
	conn: &mut SqliteConnection,
	org: &Org,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		UPDATE orgs
		SET name = ?, description = ?,
			update_app_id = ?, update_user_id = ?, update_timestamp = ?
		WHERE id = ?
		"#,
	)
	.bind(&org.name)
	.bind(&org.description);

	let result = bind_audit(query, audit.update())
		.bind(org.id.to_string())
		.execute(&mut *conn)
		.await?;

	tracing::debug!(org_external_id = %org.external_id, "org updated");
	Ok(result.rows_affected())
}

#[tracing::instrument(skip(conn), fields(org_id = %id))]
pub async fn delete_org(conn: &mut SqliteConnection, id: &OrgId) -> Result<u64, DbError> {
	let result = sqlx::query("DELETE FROM orgs WHERE id = ?")
		.bind(id.to_string())
		.execute(&mut *conn)
		.await?;

	tracing::debug!(org_id = %id, rows = result.rows_affected(), "org deleted");
	Ok(result.rows_affected())
}

fn select_orgs(filter: &str) -> String {
	format!(
		r#"
		SELECT t.id, t.external_id, t.name, t.description,
			k.id AS kind_id, k.external_id AS kind_external_id, k.description AS kind_description,
			{AUDIT_SELECT}
		FROM orgs t
		JOIN org_kinds k ON k.id = t.kind_id
		{AUDIT_JOINS}
		{filter}
		"#
	)
}

/// Look up an org and its provenance by external ID.
#[tracing::instrument(skip(conn))]
pub async fn find_org_by_external_id(
	conn: &mut SqliteConnection,
	external_id: &str,
) -> Result<Option<OrgRecord>, DbError> {
	let sql = select_orgs("WHERE t.external_id = ?");
	let row = sqlx::query(&sql)
		.bind(external_id)
		.fetch_optional(&mut *conn)
		.await?;

	row.map(|r| parse_org_record(&r)).transpose()
}

/// List every org, oldest first.
#[tracing::instrument(skip(conn))]
pub async fn list_orgs(conn: &mut SqliteConnection) -> Result<Vec<OrgRecord>, DbError> {
	let sql = select_orgs("ORDER BY t.create_timestamp, t.external_id");
	let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

	rows.iter().map(parse_org_record).collect()
}

/// Count orgs whose kind carries the given tag.
#[tracing::instrument(skip(conn))]
pub async fn count_orgs_with_kind(
	conn: &mut SqliteConnection,
	kind_external_id: &str,
) -> Result<i64, DbError> {
	let count: i64 = sqlx::query_scalar(
		r#"
		SELECT COUNT(*)
		FROM orgs o
		JOIN org_kinds k ON k.id = o.kind_id
		WHERE k.external_id = ?
		"#,
	)
	.bind(kind_external_id)
	.fetch_one(&mut *conn)
	.await?;

	Ok(count)
}

fn parse_org_record(row: &SqliteRow) -> Result<OrgRecord, DbError> {
	let id: String = row.get("id");
	let external_id: String = row.get("external_id");

	Ok(OrgRecord {
		org: Org {
			id: parse_uuid(&id, "org_id")?.into(),
			external_id: parse_external_id(&external_id)?,
			name: row.get("name"),
			description: row.get("description"),
			kind: parse_org_kind(row, "kind_id", "kind_external_id", "kind_description")?,
		},
		audit: parse_simple_audit(row)?,
	})
}
