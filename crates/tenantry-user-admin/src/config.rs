// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the user administration client.
//!
//! # Environment Variables
//!
//! | Variable | Required | Meaning |
//! |----------|----------|---------|
//! | `TENANTRY_ADMIN_BASE_URL` | yes | Identity provider root, e.g. `https://idp.example.com` |
//! | `TENANTRY_ADMIN_REALM` | yes | Realm whose users are administered |
//! | `TENANTRY_ADMIN_TIMEOUT_SECS` | no | Per-request timeout, default 30 |
//! | `TENANTRY_ADMIN_USER_AGENT` | no | Overrides the `tenantry/<version>` User-Agent |
//! | `TENANTRY_ADMIN_TOKEN_REALM` | no | Realm holding the admin client, defaults to the admin realm |
//! | `TENANTRY_ADMIN_CLIENT_ID` | client credentials | Service account client id |
//! | `TENANTRY_ADMIN_CLIENT_SECRET` / `_FILE` | client credentials | Service account secret |

use std::time::Duration;

use tenantry_common_config::{
	load_env, parse_env, require_env, require_secret_env, RequiredEnvError, SecretString,
};
use thiserror::Error;
use url::Url;

pub const ENV_BASE_URL: &str = "TENANTRY_ADMIN_BASE_URL";
pub const ENV_REALM: &str = "TENANTRY_ADMIN_REALM";
pub const ENV_TIMEOUT_SECS: &str = "TENANTRY_ADMIN_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "TENANTRY_ADMIN_USER_AGENT";
pub const ENV_TOKEN_REALM: &str = "TENANTRY_ADMIN_TOKEN_REALM";
pub const ENV_CLIENT_ID: &str = "TENANTRY_ADMIN_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "TENANTRY_ADMIN_CLIENT_SECRET";

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while assembling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error(transparent)]
	Env(#[from] RequiredEnvError),

	#[error("invalid base URL '{url}': {reason}")]
	InvalidBaseUrl { url: String, reason: String },

	#[error("invalid configuration: {0}")]
	Invalid(String),

	#[error("failed to build HTTP client: {0}")]
	HttpClient(#[from] reqwest::Error),
}

/// Where the admin API lives and how to reach it.
#[derive(Debug, Clone)]
pub struct UserAdminConfig {
	/// Identity provider root. Admin paths are appended below it.
	pub base_url: Url,
	/// Realm whose users are administered.
	pub realm: String,
	/// Applied by the default transport to every request.
	pub request_timeout: Duration,
	/// Overrides the shared User-Agent when set.
	pub user_agent: Option<String>,
}

impl UserAdminConfig {
	pub fn new(base_url: &str, realm: impl Into<String>) -> Result<Self, ConfigError> {
		let config = Self {
			base_url: parse_base_url(base_url)?,
			realm: realm.into(),
			request_timeout: DEFAULT_TIMEOUT,
			user_agent: None,
		};
		config.validate()?;
		Ok(config)
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());
		self
	}

	/// Loads the configuration from `TENANTRY_ADMIN_*` variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		let base_url = require_env(ENV_BASE_URL)?;
		let realm = require_env(ENV_REALM)?;
		let timeout = parse_env::<u64>(ENV_TIMEOUT_SECS)?
			.map(Duration::from_secs)
			.unwrap_or(DEFAULT_TIMEOUT);

		let mut config = Self::new(&base_url, realm)?.with_request_timeout(timeout);
		config.user_agent = load_env(ENV_USER_AGENT);
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.realm.trim().is_empty() {
			return Err(ConfigError::Invalid("realm cannot be empty".to_string()));
		}
		if self.request_timeout.is_zero() {
			return Err(ConfigError::Invalid(
				"request timeout must be positive".to_string(),
			));
		}
		Ok(())
	}
}

/// Service-account credentials for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct ClientCredentialsConfig {
	pub base_url: Url,
	/// Realm that owns the service-account client. Often `master`.
	pub realm: String,
	pub client_id: String,
	pub client_secret: SecretString,
}

impl ClientCredentialsConfig {
	pub fn new(
		base_url: &str,
		realm: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<SecretString>,
	) -> Result<Self, ConfigError> {
		let config = Self {
			base_url: parse_base_url(base_url)?,
			realm: realm.into(),
			client_id: client_id.into(),
			client_secret: client_secret.into(),
		};
		config.validate()?;
		Ok(config)
	}

	/// Loads credentials from the environment. The token realm falls back to
	/// `TENANTRY_ADMIN_REALM`.
	pub fn from_env() -> Result<Self, ConfigError> {
		let base_url = require_env(ENV_BASE_URL)?;
		let realm = match load_env(ENV_TOKEN_REALM) {
			Some(realm) => realm,
			None => require_env(ENV_REALM)?,
		};
		let client_id = require_env(ENV_CLIENT_ID)?;
		let client_secret = require_secret_env(ENV_CLIENT_SECRET)?;

		Self::new(&base_url, realm, client_id, client_secret)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.realm.trim().is_empty() {
			return Err(ConfigError::Invalid("token realm cannot be empty".to_string()));
		}
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::Invalid("client_id cannot be empty".to_string()));
		}
		if self.client_secret.expose().is_empty() {
			return Err(ConfigError::Invalid(
				"client_secret cannot be empty".to_string(),
			));
		}
		Ok(())
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
		url: raw.to_string(),
		reason: e.to_string(),
	})?;

	if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::InvalidBaseUrl {
			url: raw.to_string(),
			reason: "expected an http(s) URL".to_string(),
		});
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;

	#[test]
	fn new_rejects_relative_urls() {
		let err = UserAdminConfig::new("idp.example.com", "acme").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn new_rejects_non_http_schemes() {
		let err = UserAdminConfig::new("mailto:ops@example.com", "acme").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn new_rejects_empty_realm() {
		let err = UserAdminConfig::new("https://idp.example.com", " ").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
	}

	#[test]
	fn zero_timeout_is_invalid() {
		let config = UserAdminConfig::new("https://idp.example.com", "acme")
			.unwrap()
			.with_request_timeout(Duration::ZERO);
		assert!(config.validate().is_err());
	}

	#[test]
	fn credentials_debug_is_redacted() {
		let config =
			ClientCredentialsConfig::new("https://idp.example.com", "master", "svc", "top-secret")
				.unwrap();
		let debug = format!("{config:?}");
		assert!(!debug.contains("top-secret"));
	}

	#[test]
	fn credentials_reject_empty_secret() {
		let err = ClientCredentialsConfig::new("https://idp.example.com", "master", "svc", "")
			.unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
	}

	// The only test touching TENANTRY_ADMIN_* variables, so no other test
	// observes them half-set.
	#[test]
	fn from_env_reads_all_settings() {
		env::set_var(ENV_BASE_URL, "https://idp.example.com/");
		env::set_var(ENV_REALM, "acme");
		env::set_var(ENV_TIMEOUT_SECS, "5");
		env::remove_var(ENV_USER_AGENT);
		env::remove_var(ENV_TOKEN_REALM);
		env::set_var(ENV_CLIENT_ID, "admin-cli");
		env::set_var(ENV_CLIENT_SECRET, "from-env");
		env::remove_var(format!("{ENV_CLIENT_SECRET}_FILE"));

		let admin = UserAdminConfig::from_env().unwrap();
		assert_eq!(admin.realm, "acme");
		assert_eq!(admin.request_timeout, Duration::from_secs(5));
		assert!(admin.user_agent.is_none());

		let credentials = ClientCredentialsConfig::from_env().unwrap();
		assert_eq!(credentials.realm, "acme");
		assert_eq!(credentials.client_secret.expose(), "from-env");

		env::set_var(ENV_TOKEN_REALM, "master");
		assert_eq!(ClientCredentialsConfig::from_env().unwrap().realm, "master");

		env::set_var(ENV_TIMEOUT_SECS, "soon");
		assert!(matches!(
			UserAdminConfig::from_env(),
			Err(ConfigError::Env(RequiredEnvError::Invalid { .. }))
		));

		for var in [
			ENV_BASE_URL,
			ENV_REALM,
			ENV_TIMEOUT_SECS,
			ENV_TOKEN_REALM,
			ENV_CLIENT_ID,
			ENV_CLIENT_SECRET,
		] {
			env::remove_var(var);
		}
	}
}
