// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Security configuration: the key that seals API key material at rest.

use std::fmt;
use std::sync::Arc;

use keel_core::EncryptionKey;
use serde::{Deserialize, Deserializer};
use zeroize::Zeroizing;

use crate::error::ConfigError;

/// A configured secret. Zeroized on drop, redacted in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(value: impl Into<String>) -> Self {
		Self(Zeroizing::new(value.into()))
	}

	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(Self::new)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfigLayer {
	/// 64 hex characters.
	#[serde(default)]
	pub encryption_key: Option<SecretString>,
}

impl SecurityConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.encryption_key.is_some() {
			self.encryption_key = other.encryption_key;
		}
	}

	pub fn finalize(self) -> Result<SecurityConfig, ConfigError> {
		let encryption_key = match self.encryption_key {
			Some(hex) => Some(Arc::new(EncryptionKey::from_hex(hex.expose()).map_err(
				|e| ConfigError::InvalidValue {
					key: "security.encryption_key".to_string(),
					message: e.to_string(),
				},
			)?)),
			None => None,
		};
		Ok(SecurityConfig { encryption_key })
	}
}

#[derive(Debug, Clone, Default)]
pub struct SecurityConfig {
	pub encryption_key: Option<Arc<EncryptionKey>>,
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

	#[test]
	fn key_is_optional() {
		let config = SecurityConfigLayer::default().finalize().unwrap();
		assert!(config.encryption_key.is_none());
	}

	#[test]
	fn hex_key_is_parsed() {
		let layer = SecurityConfigLayer {
			encryption_key: Some(SecretString::new(KEY_HEX)),
		};
		assert!(layer.finalize().unwrap().encryption_key.is_some());
	}

	#[test]
	fn short_key_is_rejected() {
		let layer = SecurityConfigLayer {
			encryption_key: Some(SecretString::new("abcd")),
		};
		assert!(matches!(
			layer.finalize(),
			Err(ConfigError::InvalidValue { .. })
		));
	}

	#[test]
	fn secrets_are_redacted() {
		let layer = SecurityConfigLayer {
			encryption_key: Some(SecretString::new(KEY_HEX)),
		};
		assert!(!format!("{layer:?}").contains(KEY_HEX));
	}
}
