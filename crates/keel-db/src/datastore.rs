// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Sqlite, Transaction};

use crate::error::DbError;

/// An open transaction. Rolled back by sqlx if dropped without commit.
pub type Tx = Transaction<'static, Sqlite>;

#[async_trait]
pub trait Datastore: Send + Sync {
	/// Check that the database answers.
	async fn ping(&self) -> Result<(), DbError>;

	/// Open a transaction.
	async fn begin_tx(&self) -> Result<Tx, DbError>;

	/// Pool for reads outside a transaction.
	fn pool(&self) -> &SqlitePool;
}

/// [`Datastore`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteDatastore {
	pool: SqlitePool,
}

impl SqliteDatastore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl Datastore for SqliteDatastore {
	#[tracing::instrument(skip(self))]
	async fn ping(&self) -> Result<(), DbError> {
		sqlx::query("SELECT 1").execute(&self.pool).await?;
		Ok(())
	}

	async fn begin_tx(&self) -> Result<Tx, DbError> {
		let tx = self.pool.begin().await?;
		tracing::debug!("transaction opened");
		Ok(tx)
	}

	fn pool(&self) -> &SqlitePool {
		&self.pool
	}
}
