// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment lookups for admin client configuration.
//!
//! Plain settings (base URL, realm, timeouts) come from `VAR`. Credentials
//! additionally honour `VAR_FILE`, the convention used for Docker and
//! Kubernetes mounted secrets; the file form wins when both are set.

use std::path::PathBuf;
use std::{env, fs};

use thiserror::Error;

use crate::secret::SecretString;

/// Errors raised while reading a credential from the environment.
#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// A required setting or credential was absent or unusable.
#[derive(Debug, Error)]
pub enum RequiredEnvError {
	#[error("required setting not found: set {var}")]
	Missing { var: String },

	#[error("required secret not found: set either {var} or {file_var}")]
	MissingSecret { var: String, file_var: String },

	#[error("{var} is set but empty")]
	Empty { var: String },

	#[error("{var} has an invalid value: {reason}")]
	Invalid { var: String, reason: String },

	#[error(transparent)]
	Secret(#[from] SecretEnvError),
}

/// Reads an optional credential using the `VAR` / `VAR_FILE` convention.
///
/// A single trailing newline in a secret file is stripped.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(secret)));
	}

	Ok(env::var(var).ok().map(SecretString::new))
}

/// Like [`load_secret_env`] but fails when neither variable is set.
pub fn require_secret_env(var: &str) -> Result<SecretString, RequiredEnvError> {
	load_secret_env(var)?.ok_or_else(|| RequiredEnvError::MissingSecret {
		var: var.to_string(),
		file_var: format!("{var}_FILE"),
	})
}

/// Reads an optional plain setting. Blank values count as unset.
pub fn load_env(var: &str) -> Option<String> {
	env::var(var)
		.ok()
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
}

/// Reads a required plain setting.
pub fn require_env(var: &str) -> Result<String, RequiredEnvError> {
	match env::var(var) {
		Ok(value) if value.trim().is_empty() => Err(RequiredEnvError::Empty {
			var: var.to_string(),
		}),
		Ok(value) => Ok(value.trim().to_string()),
		Err(_) => Err(RequiredEnvError::Missing {
			var: var.to_string(),
		}),
	}
}

/// Reads an optional setting and parses it with `FromStr`.
pub fn parse_env<T>(var: &str) -> Result<Option<T>, RequiredEnvError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	load_env(var)
		.map(|raw| {
			raw.parse::<T>().map_err(|e| RequiredEnvError::Invalid {
				var: var.to_string(),
				reason: e.to_string(),
			})
		})
		.transpose()
}
