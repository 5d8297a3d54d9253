// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("{operation} should affect 1 row, actual: {actual}")]
	UnexpectedRowCount { operation: String, actual: u64 },
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Check that a single-row write touched exactly one row.
pub fn expect_single_row(operation: &str, rows_affected: u64) -> Result<()> {
	if rows_affected != 1 {
		return Err(DbError::UnexpectedRowCount {
			operation: operation.to_string(),
			actual: rows_affected,
		});
	}
	Ok(())
}

/// Map a unique-constraint violation to [`DbError::Conflict`].
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> DbError {
	match &err {
		sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(message()),
		_ => DbError::Sqlx(err),
	}
}
