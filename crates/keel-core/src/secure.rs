// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Opaque external identifiers and API key material.
//!
//! - [`ExternalId`]: the only identifier ever handed to callers. 16 bytes from
//!   the OS CSPRNG, base64url without padding. Never UUID-shaped, so it can
//!   never collide with an internal ID.
//! - [`EncryptionKey`]: AES-256-GCM key used to seal API keys at rest. The
//!   sealed form is `nonce || ciphertext`.
//! - [`ApiKey`]: random key material, its sealed form, and the moment it stops
//!   being valid.
//!
//! Randomness for key material goes through [`RandomSource`] so failures can
//! be surfaced (and exercised in tests) instead of panicking.

use std::fmt;

use aes_gcm::{
	aead::{Aead, KeyInit},
	Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Number of random bytes behind an external ID.
pub const EXTERNAL_ID_BYTES: usize = 16;

/// Number of random bytes behind an API key.
pub const API_KEY_BYTES: usize = 24;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum SecureError {
	#[error("random generation failed: {0}")]
	Random(String),

	#[error("encryption failed: {0}")]
	Encryption(String),

	#[error("decryption failed: {0}")]
	Decryption(String),

	#[error("invalid encryption key: {0}")]
	InvalidKey(String),

	#[error("invalid external ID: {0}")]
	InvalidIdentifier(String),
}

/// Source of cryptographically secure random bytes.
pub trait RandomSource: Send + Sync {
	fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SecureError>;
}

/// [`RandomSource`] backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
	fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SecureError> {
		OsRng
			.try_fill_bytes(dest)
			.map_err(|e| SecureError::Random(e.to_string()))
	}
}

// =============================================================================
// External identifiers
// =============================================================================

/// Opaque, publicly exposed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
	/// Generate a fresh identifier from the OS CSPRNG.
	pub fn generate() -> Self {
		let mut bytes = [0u8; EXTERNAL_ID_BYTES];
		OsRng.fill_bytes(&mut bytes);
		Self(URL_SAFE_NO_PAD.encode(bytes))
	}

	/// Parse an identifier read back from storage or supplied by a caller.
	pub fn parse(s: &str) -> Result<Self, SecureError> {
		let decoded = URL_SAFE_NO_PAD
			.decode(s)
			.map_err(|e| SecureError::InvalidIdentifier(format!("{s}: {e}")))?;
		if decoded.len() != EXTERNAL_ID_BYTES {
			return Err(SecureError::InvalidIdentifier(format!(
				"{s}: expected {EXTERNAL_ID_BYTES} bytes, got {}",
				decoded.len()
			)));
		}
		Ok(Self(s.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ExternalId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

// =============================================================================
// Encryption key
// =============================================================================

/// Symmetric key used to seal API key material. Zeroized on drop.
pub struct EncryptionKey(Zeroizing<[u8; KEY_SIZE]>);

impl EncryptionKey {
	pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
		Self(Zeroizing::new(bytes))
	}

	/// Parse a key from 64 hex characters.
	pub fn from_hex(s: &str) -> Result<Self, SecureError> {
		let decoded = Zeroizing::new(
			hex::decode(s.trim()).map_err(|e| SecureError::InvalidKey(format!("not hex: {e}")))?,
		);
		if decoded.len() != KEY_SIZE {
			return Err(SecureError::InvalidKey(format!(
				"expected {KEY_SIZE} bytes, got {}",
				decoded.len()
			)));
		}
		let mut key = Zeroizing::new([0u8; KEY_SIZE]);
		key.copy_from_slice(&decoded);
		Ok(Self(key))
	}

	/// Generate a random key.
	pub fn generate() -> Self {
		let mut key = Zeroizing::new([0u8; KEY_SIZE]);
		OsRng.fill_bytes(&mut key[..]);
		Self(key)
	}

	/// Seal `plaintext`, returning `nonce || ciphertext`.
	pub fn encrypt(
		&self,
		random: &dyn RandomSource,
		plaintext: &[u8],
	) -> Result<Vec<u8>, SecureError> {
		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.0.as_slice()));

		let mut nonce_bytes = [0u8; NONCE_SIZE];
		random.fill_bytes(&mut nonce_bytes)?;

		let ciphertext = cipher
			.encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
			.map_err(|e| SecureError::Encryption(e.to_string()))?;

		let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
		sealed.extend_from_slice(&nonce_bytes);
		sealed.extend_from_slice(&ciphertext);
		Ok(sealed)
	}

	/// Open a value produced by [`EncryptionKey::encrypt`].
	pub fn decrypt(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, SecureError> {
		if sealed.len() <= NONCE_SIZE {
			return Err(SecureError::Decryption(format!(
				"sealed value too short: {} bytes",
				sealed.len()
			)));
		}
		let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
		let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.0.as_slice()));

		let plaintext = cipher
			.decrypt(Nonce::from_slice(nonce), ciphertext)
			.map_err(|e| SecureError::Decryption(e.to_string()))?;
		Ok(Zeroizing::new(plaintext))
	}
}

impl fmt::Debug for EncryptionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("EncryptionKey([REDACTED])")
	}
}

// =============================================================================
// API keys
// =============================================================================

/// Plaintext API key. Redacted in `Debug`, zeroized on drop.
#[derive(Clone)]
pub struct ApiKeySecret(Zeroizing<String>);

impl ApiKeySecret {
	pub fn new(key: String) -> Self {
		Self(Zeroizing::new(key))
	}

	/// Access the plaintext. Call sites must opt in.
	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for ApiKeySecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ApiKeySecret([REDACTED])")
	}
}

/// An API key belonging to an app.
#[derive(Debug, Clone)]
pub struct ApiKey {
	key: ApiKeySecret,
	ciphertext: String,
	deactivation: DateTime<Utc>,
}

impl ApiKey {
	/// Generate new key material and seal it with `encryption_key`.
	///
	/// Either every field is populated or an error is returned.
	pub fn issue(
		random: &dyn RandomSource,
		encryption_key: &EncryptionKey,
		deactivation: DateTime<Utc>,
	) -> Result<Self, SecureError> {
		let mut raw = Zeroizing::new([0u8; API_KEY_BYTES]);
		random.fill_bytes(&mut raw[..])?;
		let key = URL_SAFE_NO_PAD.encode(raw.as_slice());

		let sealed = encryption_key.encrypt(random, key.as_bytes())?;

		Ok(Self {
			key: ApiKeySecret::new(key),
			ciphertext: hex::encode(sealed),
			deactivation,
		})
	}

	/// Rebuild a key from its stored, hex-encoded sealed form.
	pub fn from_ciphertext(
		ciphertext: &str,
		encryption_key: &EncryptionKey,
		deactivation: DateTime<Utc>,
	) -> Result<Self, SecureError> {
		let sealed = hex::decode(ciphertext)
			.map_err(|e| SecureError::Decryption(format!("ciphertext is not hex: {e}")))?;
		let plaintext = encryption_key.decrypt(&sealed)?;
		let key = String::from_utf8(plaintext.to_vec())
			.map_err(|e| SecureError::Decryption(format!("key is not UTF-8: {e}")))?;

		Ok(Self {
			key: ApiKeySecret::new(key),
			ciphertext: ciphertext.to_string(),
			deactivation,
		})
	}

	pub fn key(&self) -> &ApiKeySecret {
		&self.key
	}

	pub fn ciphertext(&self) -> &str {
		&self.ciphertext
	}

	pub fn deactivation(&self) -> DateTime<Utc> {
		self.deactivation
	}

	/// A key is invalid at and after its deactivation moment.
	pub fn is_valid_at(&self, moment: DateTime<Utc>) -> bool {
		moment < self.deactivation
	}
}
