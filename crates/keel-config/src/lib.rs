// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for Keel.
//!
//! Layers are merged from built-in defaults, an optional TOML file and
//! `KEEL_*` environment variables, in that order of increasing precedence.
//!
//! ```ignore
//! let config = keel_config::load_config()?;
//! let pool = keel_db::create_pool(&config.database.url).await?;
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

use std::path::PathBuf;

pub use env::load_secret_env;
pub use error::ConfigError;
pub use layer::KeelConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct KeelConfig {
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub security: SecurityConfig,
}

/// Load configuration from defaults, `/etc/keel/keel.toml` and the environment.
pub fn load_config() -> Result<KeelConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource::new()),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<KeelConfig, ConfigError> {
	load_from(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<KeelConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = KeelConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: KeelConfigLayer) -> Result<KeelConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();
	let security = layer.security.unwrap_or_default().finalize()?;

	info!(
		database = %database.url,
		log_format = %logging.format,
		encryption_key_configured = security.encryption_key.is_some(),
		"configuration loaded"
	);

	Ok(KeelConfig {
		database,
		logging,
		security,
	})
}
