// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::secure::SecureError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
	#[error("Validation error: {0}")]
	Validation(String),

	#[error(transparent)]
	Secure(#[from] SecureError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
