// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transaction scoping for provisioning operations.
//!
//! Services follow one shape:
//!
//! ```ignore
//! let mut tx = self.coordinator.begin().await?;
//! let outcome = self.write_in(&mut tx, ..).await;
//! self.coordinator.finish(tx, outcome).await
//! ```
//!
//! [`TransactionCoordinator::finish`] consumes the transaction, so exactly one
//! of commit or rollback runs. A transaction dropped without either (a
//! cancelled future, a panic) is rolled back by sqlx.

use std::sync::Arc;

use keel_db::{Datastore, DbError, Tx};

use crate::error::{ProvisioningError, Result};

#[derive(Clone)]
pub struct TransactionCoordinator {
	datastore: Arc<dyn Datastore>,
}

impl TransactionCoordinator {
	pub fn new(datastore: Arc<dyn Datastore>) -> Self {
		Self { datastore }
	}

	pub async fn begin(&self) -> Result<Tx> {
		Ok(self.datastore.begin_tx().await?)
	}

	pub async fn commit(&self, tx: Tx) -> Result<()> {
		tx.commit().await.map_err(DbError::from)?;
		tracing::debug!("transaction committed");
		Ok(())
	}

	/// Roll back and hand back `cause`, or a database error if the rollback
	/// itself fails.
	pub async fn rollback(&self, tx: Tx, cause: ProvisioningError) -> ProvisioningError {
		match tx.rollback().await {
			Ok(()) => {
				tracing::warn!(error = %cause, "transaction rolled back");
				cause
			}
			Err(e) => {
				tracing::error!(error = %e, cause = %cause, "transaction rollback failed");
				ProvisioningError::Database(DbError::from(e))
			}
		}
	}

	/// Commit on `Ok`, roll back on `Err`.
	pub async fn finish<T>(&self, tx: Tx, outcome: Result<T>) -> Result<T> {
		match outcome {
			Ok(value) => {
				self.commit(tx).await?;
				Ok(value)
			}
			Err(cause) => Err(self.rollback(tx, cause).await),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keel_db::{create_memory_pool, SqliteDatastore};

	async fn coordinator() -> (TransactionCoordinator, sqlx::SqlitePool) {
		let pool = create_memory_pool().await.unwrap();
		let datastore = Arc::new(SqliteDatastore::new(pool.clone()));
		(TransactionCoordinator::new(datastore), pool)
	}

	async fn scratch_rows(pool: &sqlx::SqlitePool) -> i64 {
		sqlx::query_scalar("SELECT COUNT(*) FROM scratch")
			.fetch_one(pool)
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn finish_commits_ok_outcome() {
		let (coordinator, pool) = coordinator().await;
		sqlx::query("CREATE TABLE scratch (id INTEGER)")
			.execute(&pool)
			.await
			.unwrap();

		let mut tx = coordinator.begin().await.unwrap();
		sqlx::query("INSERT INTO scratch (id) VALUES (1)")
			.execute(&mut *tx)
			.await
			.unwrap();
		let value = coordinator.finish(tx, Ok(7)).await.unwrap();

		assert_eq!(value, 7);
		assert_eq!(scratch_rows(&pool).await, 1);
	}

	#[tokio::test]
	async fn finish_rolls_back_and_keeps_the_cause() {
		let (coordinator, pool) = coordinator().await;
		sqlx::query("CREATE TABLE scratch (id INTEGER)")
			.execute(&pool)
			.await
			.unwrap();

		let mut tx = coordinator.begin().await.unwrap();
		sqlx::query("INSERT INTO scratch (id) VALUES (1)")
			.execute(&mut *tx)
			.await
			.unwrap();
		let outcome: Result<()> = Err(ProvisioningError::Validation("no".to_string()));
		let err = coordinator.finish(tx, outcome).await.unwrap_err();

		assert!(matches!(err, ProvisioningError::Validation(ref m) if m == "no"));
		assert_eq!(scratch_rows(&pool).await, 0);
	}
}
