// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use keel_db::Datastore;

use crate::response::PingResponse;

/// Reports whether the database answers.
#[derive(Clone)]
pub struct PingService {
	datastore: Arc<dyn Datastore>,
}

impl PingService {
	pub fn new(datastore: Arc<dyn Datastore>) -> Self {
		Self { datastore }
	}

	/// A failed ping is logged and reported as `db_up: false`, never as an
	/// error.
	#[tracing::instrument(skip(self))]
	pub async fn ping(&self) -> PingResponse {
		match self.datastore.ping().await {
			Ok(()) => PingResponse { db_up: true },
			Err(e) => {
				tracing::error!(error = %e, "database ping failed");
				PingResponse { db_up: false }
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keel_db::{create_memory_pool, SqliteDatastore};

	#[tokio::test]
	async fn reports_database_state() {
		let pool = create_memory_pool().await.unwrap();
		let service = PingService::new(Arc::new(SqliteDatastore::new(pool.clone())));
		assert!(service.ping().await.db_up);

		pool.close().await;
		assert!(!service.ping().await.db_up);
	}
}
