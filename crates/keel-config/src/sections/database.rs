// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `[database]`: where the tenancy store lives.

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_URL: &str = "sqlite:./keel.db";
const SCHEME: &str = "sqlite:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	/// A `sqlite:` connection URL, e.g. `sqlite:/var/lib/keel/keel.db`.
	pub url: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_URL.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	/// Resolve the URL, rejecting blanks and anything but SQLite.
	pub fn finalize(self) -> Result<DatabaseConfig, ConfigError> {
		let url = match self.url {
			Some(url) => url.trim().to_string(),
			None => return Ok(DatabaseConfig::default()),
		};

		if url.is_empty() {
			return Err(ConfigError::invalid("database.url", "must not be empty"));
		}
		if !url.starts_with(SCHEME) {
			return Err(ConfigError::invalid(
				"database.url",
				format!("only {SCHEME} URLs are supported, got {url}"),
			));
		}

		Ok(DatabaseConfig { url })
	}
}
