// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::{env_var, load_secret_env};
use crate::error::ConfigError;
use crate::layer::KeelConfigLayer;
use crate::sections::{DatabaseConfigLayer, LogFormat, LoggingConfigLayer, SecurityConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<KeelConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<KeelConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(KeelConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/keel/keel.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<KeelConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(KeelConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: KeelConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::Parse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `<PREFIX>_<SECTION>_<FIELD>`, with `KEEL` as the prefix.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn new() -> Self {
		Self::with_prefix("KEEL")
	}

	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn var(&self, suffix: &str) -> String {
		format!("{}_{suffix}", self.prefix)
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<KeelConfigLayer, ConfigError> {
		debug!(prefix = %self.prefix, "loading environment variables");

		let format_var = self.var("LOG_FORMAT");
		let format = match env_var(&format_var) {
			Some(v) => Some(v.parse::<LogFormat>().map_err(|message| {
				ConfigError::InvalidValue {
					key: format_var.clone(),
					message,
				}
			})?),
			None => None,
		};

		Ok(KeelConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: env_var(&self.var("DATABASE_URL")),
			}),
			logging: Some(LoggingConfigLayer {
				level: env_var(&self.var("LOG_LEVEL")),
				format,
			}),
			security: Some(SecurityConfigLayer {
				encryption_key: load_secret_env(&self.var("ENCRYPTION_KEY"))?,
			}),
		})
	}
}
