// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("cannot read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("{} is not valid TOML: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// A setting was present but unusable. `key` is the dotted TOML path or
	/// the environment variable it came from.
	#[error("invalid {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("{var} is set to an empty path")]
	EmptySecretFile { var: String },
}

impl ConfigError {
	pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}
