// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

/// Apply the tenancy schema.
///
/// # Note
/// Every statement is `IF NOT EXISTS`, so this is safe to run repeatedly.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	let m1 = include_str!("../migrations/001_tenancy.sql");
	for stmt in m1.split(';').filter(|s| !s.trim().is_empty()) {
		sqlx::query(stmt).execute(pool).await?;
	}

	tracing::info!("database migrations applied");
	Ok(())
}
