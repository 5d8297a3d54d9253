// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{
	SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Create a SqlitePool with WAL mode and foreign keys enforced.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./keel.db")
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid, `DbError::Sqlx` if the
/// connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Create a migrated in-memory database on a single connection.
///
/// An in-memory SQLite database lives and dies with its connection, so the
/// pool is capped at one. Callers must not touch the pool while a
/// transaction from it is open.
pub async fn create_memory_pool() -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(":memory:")
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await?;

	run_migrations(&pool).await?;
	Ok(pool)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn file_pool_is_created_and_migrated() {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("keel.db").display());

		let pool = create_pool(&url).await.unwrap();
		run_migrations(&pool).await.unwrap();
		run_migrations(&pool).await.unwrap();

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orgs")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(count, 0);
	}

	#[tokio::test]
	async fn invalid_url_is_internal_error() {
		let result = create_pool("sqlite:keel.db?mode=bogus").await;
		assert!(matches!(result, Err(DbError::Internal(_))));
	}
}
