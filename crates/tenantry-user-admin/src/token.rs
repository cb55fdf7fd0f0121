// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token suppliers.
//!
//! The client asks its [`TokenSupplier`] for a token once per operation and
//! never keeps the result, since tokens may expire between calls. Whether a
//! supplier caches is its own business.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tenantry_common_config::SecretString;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{ClientCredentialsConfig, ConfigError, DEFAULT_TIMEOUT};
use crate::endpoints::token_endpoint;
use crate::error::TokenError;

/// Produces a currently valid bearer token.
#[async_trait]
pub trait TokenSupplier: Send + Sync {
	async fn token(&self) -> Result<SecretString, TokenError>;
}

#[async_trait]
impl<T: TokenSupplier + ?Sized> TokenSupplier for Arc<T> {
	async fn token(&self) -> Result<SecretString, TokenError> {
		(**self).token().await
	}
}

/// Hands out a fixed token, for short-lived scripts and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenSupplier {
	token: SecretString,
}

impl StaticTokenSupplier {
	pub fn new(token: impl Into<SecretString>) -> Self {
		Self {
			token: token.into(),
		}
	}
}

#[async_trait]
impl TokenSupplier for StaticTokenSupplier {
	async fn token(&self) -> Result<SecretString, TokenError> {
		Ok(self.token.clone())
	}
}

/// Requests a fresh service-account token on every call using the OAuth 2.0
/// client-credentials grant.
#[derive(Debug, Clone)]
pub struct ClientCredentialsTokenSupplier {
	http_client: reqwest::Client,
	token_url: Url,
	client_id: String,
	client_secret: SecretString,
}

#[derive(Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
}

impl ClientCredentialsTokenSupplier {
	pub fn new(config: ClientCredentialsConfig) -> Result<Self, ConfigError> {
		let http_client = tenantry_common_http::new_client_with_timeout(DEFAULT_TIMEOUT)?;
		Self::with_http_client(config, http_client)
	}

	pub fn with_http_client(
		config: ClientCredentialsConfig,
		http_client: reqwest::Client,
	) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self {
			http_client,
			token_url: token_endpoint(&config.base_url, &config.realm)?,
			client_id: config.client_id,
			client_secret: config.client_secret,
		})
	}

	pub fn token_url(&self) -> &Url {
		&self.token_url
	}
}

#[async_trait]
impl TokenSupplier for ClientCredentialsTokenSupplier {
	#[instrument(skip(self), fields(client_id = %self.client_id))]
	async fn token(&self) -> Result<SecretString, TokenError> {
		let form = [
			("grant_type", "client_credentials"),
			("client_id", self.client_id.as_str()),
			("client_secret", self.client_secret.expose().as_str()),
		];

		let response = self
			.http_client
			.post(self.token_url.clone())
			.form(&form)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			warn!(status = status.as_u16(), "Token endpoint rejected client credentials");
			return Err(TokenError::Rejected {
				status: status.as_u16(),
				message,
			});
		}

		let body: TokenResponse = response.json().await?;
		let token = body
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(TokenError::MissingAccessToken)?;

		debug!("Obtained service account token");
		Ok(SecretString::new(token))
	}
}
