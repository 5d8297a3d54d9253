// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row operations for the `org_kinds` lookup table.

use keel_core::{OrgKind, SimpleAudit};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::audit::{bind_simple_audit, parse_simple_audit, parse_uuid, AUDIT_JOINS, AUDIT_SELECT};
use crate::error::{conflict_on_unique, DbError};

/// An org kind with its provenance.
#[derive(Debug, Clone)]
pub struct OrgKindRecord {
	pub kind: OrgKind,
	pub audit: SimpleAudit,
}

/// Insert an org kind.
///
/// # Errors
/// Returns `DbError::Conflict` if the tag already exists.
#[tracing::instrument(skip(conn, kind, audit), fields(org_kind = %kind.external_id))]
pub async fn insert_org_kind(
	conn: &mut SqliteConnection,
	kind: &OrgKind,
	audit: &SimpleAudit,
) -> Result<u64, DbError> {
	let query = sqlx::query(
		r#"
		INSERT INTO org_kinds (
			id, external_id, description,
			create_app_id, create_user_id, create_timestamp,
			update_app_id, update_user_id, update_timestamp
		) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(kind.id.to_string())
	.bind(&kind.external_id)
	.bind(&kind.description);

	let result = bind_simple_audit(query, audit)
		.execute(&mut *conn)
		.await
		.map_err(|e| conflict_on_unique(e, || format!("org kind {} already exists", kind.external_id)))?;

	tracing::debug!(org_kind = %kind.external_id, "org kind inserted");
	Ok(result.rows_affected())
}

/// Look up an org kind by its tag.
///
/// # Returns
/// `None` if no kind carries this tag.
#[tracing::instrument(skip(conn))]
pub async fn find_org_kind_by_external_id(
	conn: &mut SqliteConnection,
	external_id: &str,
) -> Result<Option<OrgKind>, DbError> {
	let row = sqlx::query(
		r#"
		SELECT id, external_id, description
		FROM org_kinds
		WHERE external_id = ?
		"#,
	)
	.bind(external_id)
	.fetch_optional(&mut *conn)
	.await?;

	row.map(|r| parse_org_kind(&r, "id", "external_id", "description"))
		.transpose()
}

/// List every org kind, ordered by tag.
#[tracing::instrument(skip(conn))]
pub async fn list_org_kinds(conn: &mut SqliteConnection) -> Result<Vec<OrgKindRecord>, DbError> {
	let sql = format!(
		r#"
		SELECT t.id, t.external_id, t.description, {AUDIT_SELECT}
		FROM org_kinds t
		{AUDIT_JOINS}
		ORDER BY t.external_id
		"#
	);
	let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

	rows
		.iter()
		.map(|r| {
			Ok(OrgKindRecord {
				kind: parse_org_kind(r, "id", "external_id", "description")?,
				audit: parse_simple_audit(r)?,
			})
		})
		.collect()
}

/// Parse kind columns under the given names, so joined selects can alias them.
pub(crate) fn parse_org_kind(
	row: &SqliteRow,
	id_column: &str,
	external_id_column: &str,
	description_column: &str,
) -> Result<OrgKind, DbError> {
	let id: String = row.get(id_column);
	Ok(OrgKind {
		id: parse_uuid(&id, "org_kind_id")?.into(),
		external_id: row.get(external_id_column),
		description: row.get(description_column),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{seed_actor, test_pool};

	#[tokio::test]
	async fn kinds_are_found_by_tag() {
		let pool = test_pool().await;
		let mut conn = pool.acquire().await.unwrap();
		let actor = seed_actor(&mut conn).await;

		let found = find_org_kind_by_external_id(&mut conn, "fixture")
			.await
			.unwrap();
		assert_eq!(found, Some(actor.kind));
		assert!(find_org_kind_by_external_id(&mut conn, "standard")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn duplicate_tag_is_conflict() {
		let pool = test_pool().await;
		let mut conn = pool.acquire().await.unwrap();
		let actor = seed_actor(&mut conn).await;

		let again = actor.factory.new_org_kind("fixture", "second copy");
		let result = insert_org_kind(&mut conn, &again, &actor.audit).await;
		assert!(matches!(result, Err(DbError::Conflict(_))));
	}

	#[tokio::test]
	async fn list_carries_provenance() {
		let pool = test_pool().await;
		let mut conn = pool.acquire().await.unwrap();
		let actor = seed_actor(&mut conn).await;

		let standard = actor.factory.new_org_kind("standard", "standard kind");
		insert_org_kind(&mut conn, &standard, &actor.audit)
			.await
			.unwrap();

		let kinds = list_org_kinds(&mut conn).await.unwrap();
		let tags: Vec<_> = kinds.iter().map(|k| k.kind.external_id.as_str()).collect();
		assert_eq!(tags, vec!["fixture", "standard"]);
		assert_eq!(kinds[1].audit, actor.audit);
	}
}
