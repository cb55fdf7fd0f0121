// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The user administration client.

use std::sync::Arc;

use http::HeaderMap;
use tracing::{info, instrument};

use crate::attributes;
use crate::config::{ClientCredentialsConfig, ConfigError, UserAdminConfig};
use crate::endpoints::UserEndpoints;
use crate::error::{AdminError, Result};
use crate::headers::build_auth_headers;
use crate::provisioning;
use crate::roles;
use crate::token::{ClientCredentialsTokenSupplier, TokenSupplier};
use crate::transport::{AdminRequest, ReqwestTransport, Transport};
use crate::types::{Attribute, CredentialOptions, NewUser, RoleResolution, UserRepresentation};

/// Builder for constructing a [`UserAdminClient`].
#[derive(Default)]
pub struct UserAdminClientBuilder {
	config: Option<UserAdminConfig>,
	transport: Option<Arc<dyn Transport>>,
	tokens: Option<Arc<dyn TokenSupplier>>,
}

impl UserAdminClientBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the admin API location and request settings.
	pub fn config(mut self, config: UserAdminConfig) -> Self {
		self.config = Some(config);
		self
	}

	/// Replaces the default reqwest transport.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Sets where bearer tokens come from.
	pub fn token_supplier(mut self, supplier: impl TokenSupplier + 'static) -> Self {
		self.tokens = Some(Arc::new(supplier));
		self
	}

	pub fn build(self) -> Result<UserAdminClient> {
		let config = self
			.config
			.ok_or_else(|| ConfigError::Invalid("admin config is required".to_string()))?;
		let tokens = self
			.tokens
			.ok_or_else(|| ConfigError::Invalid("token supplier is required".to_string()))?;

		config.validate()?;
		let endpoints = UserEndpoints::new(&config.base_url, &config.realm)?;

		let transport = match self.transport {
			Some(transport) => transport,
			None => Arc::new(ReqwestTransport::from_config(&config)?),
		};

		info!(
			base_url = %config.base_url,
			realm = %config.realm,
			"User admin client initialized"
		);

		Ok(UserAdminClient {
			inner: Arc::new(ClientInner {
				endpoints,
				transport,
				tokens,
			}),
		})
	}
}

struct ClientInner {
	endpoints: UserEndpoints,
	transport: Arc<dyn Transport>,
	tokens: Arc<dyn TokenSupplier>,
}

/// Reads and writes users in one realm of the identity provider's admin API.
///
/// Every operation asks the token supplier for a fresh token once. Cloning is
/// cheap and clones share the transport.
///
/// # Example
///
/// ```ignore
/// use tenantry_user_admin::{NewUser, StaticTokenSupplier, UserAdminClient, UserAdminConfig};
///
/// let client = UserAdminClient::builder()
///     .config(UserAdminConfig::new("https://idp.example.com", "acme")?)
///     .token_supplier(StaticTokenSupplier::new(token))
///     .build()?;
///
/// let id = client
///     .create(NewUser::new("ada").with_email("ada@example.com").with_password("initial"))
///     .await?;
/// let roles = client.roles(&id, &["billing".to_string()], true).await?;
/// ```
#[derive(Clone)]
pub struct UserAdminClient {
	inner: Arc<ClientInner>,
}

impl UserAdminClient {
	pub fn builder() -> UserAdminClientBuilder {
		UserAdminClientBuilder::new()
	}

	/// Builds a client from `TENANTRY_ADMIN_*` variables, authenticating with
	/// the client-credentials grant.
	pub fn from_env() -> Result<Self> {
		let config = UserAdminConfig::from_env()?;
		let credentials = ClientCredentialsConfig::from_env()?;
		let supplier = ClientCredentialsTokenSupplier::new(credentials)?;

		Self::builder()
			.config(config)
			.token_supplier(supplier)
			.build()
	}

	pub fn endpoints(&self) -> &UserEndpoints {
		&self.inner.endpoints
	}

	async fn auth_headers(&self) -> Result<HeaderMap> {
		build_auth_headers(self.inner.tokens.as_ref()).await
	}

	/// Fetches the full user record.
	#[instrument(skip(self))]
	pub async fn details(&self, user_id: &str) -> Result<UserRepresentation> {
		let headers = self.auth_headers().await?;

		let request = AdminRequest::get(self.inner.endpoints.user(user_id)?, headers);
		let response = self
			.inner
			.transport
			.send(request)
			.await?
			.error_for_status()?;

		response
			.json()
			.map_err(|e| AdminError::InvalidResponse(format!("user record: {e}")))
	}

	/// Resolves the user's effective roles in each client in `client_ids`,
	/// plus the realm when `include_realm` is set.
	///
	/// Scope lookups run concurrently. Only a missing token is an `Err`;
	/// lookup failures are reported through [`RoleResolution::Failed`].
	#[instrument(skip(self, client_ids), fields(client_count = client_ids.len()))]
	pub async fn roles(
		&self,
		user_id: &str,
		client_ids: &[String],
		include_realm: bool,
	) -> Result<RoleResolution> {
		let headers = self.auth_headers().await?;

		Ok(roles::resolve_roles(
			self.inner.transport.as_ref(),
			&self.inner.endpoints,
			&headers,
			user_id,
			client_ids,
			include_realm,
		)
		.await)
	}

	/// Creates a user and returns its id. See [`create_with_options`](Self::create_with_options).
	pub async fn create(&self, user: NewUser) -> Result<String> {
		self.create_with_options(user, CredentialOptions::default())
			.await
	}

	/// Creates a user, then seeds its password and sends the verification
	/// email.
	///
	/// Returns `Ok` once the user exists, whether or not the follow-up steps
	/// succeeded.
	#[instrument(skip_all, fields(username = %user.profile.username))]
	pub async fn create_with_options(
		&self,
		user: NewUser,
		options: CredentialOptions,
	) -> Result<String> {
		let headers = self.auth_headers().await?;

		provisioning::provision_user(
			self.inner.transport.as_ref(),
			&self.inner.endpoints,
			&headers,
			user,
			options,
		)
		.await
	}

	/// Merges `attributes` into the user's stored attributes.
	///
	/// A key already present is replaced by the new value list. When the
	/// current attributes cannot be read, the write goes ahead with only
	/// `attributes`.
	#[instrument(skip(self, attributes), fields(attribute_count = attributes.len()))]
	pub async fn add_attributes(&self, user_id: &str, attributes: Vec<Attribute>) -> Result<()> {
		let headers = self.auth_headers().await?;

		attributes::add_attributes(
			self.inner.transport.as_ref(),
			&self.inner.endpoints,
			&headers,
			user_id,
			attributes,
		)
		.await?;
		Ok(())
	}

	/// The user's attributes in stored order, or empty when they cannot be
	/// read. Use [`try_get_attributes`](Self::try_get_attributes) to see why.
	#[instrument(skip(self))]
	pub async fn get_attributes(&self, user_id: &str) -> Result<Vec<Attribute>> {
		let headers = self.auth_headers().await?;

		Ok(attributes::read_attributes_lenient(
			self.inner.transport.as_ref(),
			&self.inner.endpoints,
			&headers,
			user_id,
		)
		.await)
	}

	/// Like [`get_attributes`](Self::get_attributes) but reports read and
	/// parse failures.
	#[instrument(skip(self))]
	pub async fn try_get_attributes(&self, user_id: &str) -> Result<Vec<Attribute>> {
		let headers = self.auth_headers().await?;

		attributes::read_attributes(
			self.inner.transport.as_ref(),
			&self.inner.endpoints,
			&headers,
			user_id,
		)
		.await
	}
}
