// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use keel_core::{CoreError, SecureError};
use keel_db::DbError;

/// Coarse classification of a [`ProvisioningError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Caller input or a precondition was rejected.
	Validation,
	/// The requested entity does not exist.
	NotExist,
	/// A storage call failed or touched an unexpected number of rows.
	Database,
	/// Key material could not be generated, sealed or opened.
	Internal,
}

/// Errors that can occur during provisioning.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	#[error("validation error: {0}")]
	Validation(String),

	#[error("not found: {0}")]
	NotExist(String),

	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("internal error: {0}")]
	Internal(String),
}

impl ProvisioningError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Validation(_) => ErrorKind::Validation,
			Self::NotExist(_) => ErrorKind::NotExist,
			Self::Database(_) => ErrorKind::Database,
			Self::Internal(_) => ErrorKind::Internal,
		}
	}
}

impl From<CoreError> for ProvisioningError {
	fn from(err: CoreError) -> Self {
		match err {
			CoreError::Validation(message) => Self::Validation(message),
			CoreError::Secure(e) => Self::Internal(e.to_string()),
		}
	}
}

impl From<SecureError> for ProvisioningError {
	fn from(err: SecureError) -> Self {
		Self::Internal(err.to_string())
	}
}

impl From<sqlx::Error> for ProvisioningError {
	fn from(err: sqlx::Error) -> Self {
		Self::Database(DbError::from(err))
	}
}

/// Result type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisioningError>;
