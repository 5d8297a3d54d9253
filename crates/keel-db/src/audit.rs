// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit column helpers shared by every audited table.
//!
//! Audited selects alias their table as `t` and splice in [`AUDIT_SELECT`]
//! and [`AUDIT_JOINS`], which resolve the acting app's external ID and the
//! acting user's name for both the create and the update stamp.

use chrono::{DateTime, Utc};
use keel_core::{Audit, AuditApp, AuditUser, ExternalId, SimpleAudit};
use sqlx::{
	query::Query,
	sqlite::{SqliteArguments, SqliteRow},
	Row, Sqlite,
};
use uuid::Uuid;

use crate::error::DbError;

pub(crate) const AUDIT_SELECT: &str = r#"
	t.create_app_id, ca.external_id AS create_app_external_id,
	t.create_user_id, cu.username AS create_username,
	cp.first_name AS create_first_name, cp.last_name AS create_last_name,
	t.create_timestamp,
	t.update_app_id, ua.external_id AS update_app_external_id,
	t.update_user_id, uu.username AS update_username,
	up.first_name AS update_first_name, up.last_name AS update_last_name,
	t.update_timestamp"#;

pub(crate) const AUDIT_JOINS: &str = r#"
	JOIN apps ca ON ca.id = t.create_app_id
	JOIN users cu ON cu.id = t.create_user_id
	JOIN person_profiles cp ON cp.id = cu.profile_id
	JOIN apps ua ON ua.id = t.update_app_id
	JOIN users uu ON uu.id = t.update_user_id
	JOIN person_profiles up ON up.id = uu.profile_id"#;

/// Bind the six create/update audit columns in table order.
pub(crate) fn bind_simple_audit<'q>(
	query: Query<'q, Sqlite, SqliteArguments<'q>>,
	audit: &SimpleAudit,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
	let query = bind_audit(query, audit.create());
	bind_audit(query, audit.update())
}

/// Bind one stamp as `(app_id, user_id, timestamp)`.
pub(crate) fn bind_audit<'q>(
	query: Query<'q, Sqlite, SqliteArguments<'q>>,
	audit: &Audit,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
	query
		.bind(audit.app().id.to_string())
		.bind(audit.user().id.to_string())
		.bind(audit.moment().to_rfc3339())
}

pub(crate) fn parse_simple_audit(row: &SqliteRow) -> Result<SimpleAudit, DbError> {
	Ok(SimpleAudit::from_parts(
		parse_audit(row, "create")?,
		parse_audit(row, "update")?,
	))
}

fn parse_audit(row: &SqliteRow, prefix: &str) -> Result<Audit, DbError> {
	let app_id: String = row.get(format!("{prefix}_app_id").as_str());
	let app_external_id: String = row.get(format!("{prefix}_app_external_id").as_str());
	let user_id: String = row.get(format!("{prefix}_user_id").as_str());
	let timestamp: String = row.get(format!("{prefix}_timestamp").as_str());

	Ok(Audit::from_parts(
		AuditApp {
			id: parse_uuid(&app_id, "app_id")?.into(),
			external_id: parse_external_id(&app_external_id)?,
		},
		AuditUser {
			id: parse_uuid(&user_id, "user_id")?.into(),
			username: row.get(format!("{prefix}_username").as_str()),
			first_name: row.get(format!("{prefix}_first_name").as_str()),
			last_name: row.get(format!("{prefix}_last_name").as_str()),
		},
		parse_timestamp(&timestamp)?,
	))
}

pub(crate) fn parse_uuid(s: &str, column: &str) -> Result<Uuid, DbError> {
	Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parse_external_id(s: &str) -> Result<ExternalId, DbError> {
	ExternalId::parse(s).map_err(|e| DbError::Internal(e.to_string()))
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(s)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid timestamp {s}: {e}")))
}
