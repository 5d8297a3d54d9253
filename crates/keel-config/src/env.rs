// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment helpers, including the `VAR` / `VAR_FILE` secret convention.

use std::path::PathBuf;
use std::{env, fs};

use crate::error::ConfigError;
use crate::sections::SecretString;

pub(crate) fn env_var(name: &str) -> Option<String> {
	env::var(name).ok().filter(|s| !s.is_empty())
}

/// Load a secret from `{var}_FILE` if set, else from `{var}`.
///
/// A single trailing newline is stripped from file contents.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, ConfigError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(ConfigError::EmptySecretFile { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
			path: path.clone(),
			source: e,
		})?;
		let secret = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(SecretString::new(secret)));
	}

	Ok(env_var(var).map(SecretString::new))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn unset_secret_is_none() {
		assert!(load_secret_env("KEEL_TEST_SECRET_UNSET").unwrap().is_none());
	}

	#[test]
	fn direct_value_is_used() {
		env::set_var("KEEL_TEST_SECRET_DIRECT", "hunter2");
		let secret = load_secret_env("KEEL_TEST_SECRET_DIRECT").unwrap().unwrap();
		assert_eq!(secret.expose(), "hunter2");
		env::remove_var("KEEL_TEST_SECRET_DIRECT");
	}

	#[test]
	fn file_wins_and_loses_one_trailing_newline() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		env::set_var("KEEL_TEST_SECRET_BOTH", "from-env");
		env::set_var("KEEL_TEST_SECRET_BOTH_FILE", file.path());
		let secret = load_secret_env("KEEL_TEST_SECRET_BOTH").unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");
		env::remove_var("KEEL_TEST_SECRET_BOTH");
		env::remove_var("KEEL_TEST_SECRET_BOTH_FILE");
	}

	#[test]
	fn missing_file_is_an_error() {
		env::set_var("KEEL_TEST_SECRET_MISSING_FILE", "/nonexistent/keel/secret");
		let result = load_secret_env("KEEL_TEST_SECRET_MISSING");
		assert!(matches!(result, Err(ConfigError::Read { .. })));
		env::remove_var("KEEL_TEST_SECRET_MISSING_FILE");
	}

	#[test]
	fn empty_file_path_is_an_error() {
		env::set_var("KEEL_TEST_SECRET_EMPTY_FILE", "");
		let result = load_secret_env("KEEL_TEST_SECRET_EMPTY");
		assert!(matches!(
			result,
			Err(ConfigError::EmptySecretFile { ref var }) if var == "KEEL_TEST_SECRET_EMPTY_FILE"
		));
		env::remove_var("KEEL_TEST_SECRET_EMPTY_FILE");
	}
}
