// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User administration client for a realm-scoped identity provider admin API.
//!
//! Covers the user lifecycle an application backend needs when it delegates
//! identity to an external provider:
//!
//! - **Details**: fetch the full user record
//! - **Roles**: resolve effective roles across the realm and any number of
//!   clients, concurrently, with per-scope failures reported in the result
//! - **Provisioning**: create a user, then seed its password and send the
//!   verification email as best-effort follow-ups
//! - **Attributes**: read, and merge new custom attributes into the stored
//!   ones with last-write-wins per key
//!
//! Every operation takes a fresh bearer token from a [`TokenSupplier`].
//!
//! # Example
//!
//! ```ignore
//! use tenantry_user_admin::{Attribute, UserAdminClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // TENANTRY_ADMIN_BASE_URL, TENANTRY_ADMIN_REALM, TENANTRY_ADMIN_CLIENT_ID
//!     // and TENANTRY_ADMIN_CLIENT_SECRET (or _FILE) must be set.
//!     let client = UserAdminClient::from_env()?;
//!
//!     let resolution = client
//!         .roles("9f1c2a7e", &["billing".to_string(), "reports".to_string()], true)
//!         .await?;
//!     if resolution.has_role("admin") {
//!         client
//!             .add_attributes("9f1c2a7e", vec![Attribute::single("tier", "gold")])
//!             .await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod attributes;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod headers;
pub mod provisioning;
pub mod roles;
pub mod token;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use attributes::{merge_attributes, parse_attribute_field};
pub use client::{UserAdminClient, UserAdminClientBuilder};
pub use config::{ClientCredentialsConfig, ConfigError, UserAdminConfig};
pub use endpoints::{token_endpoint, UserEndpoints};
pub use error::{
	AdminError, Result, ScopeFailure, ScopeFailureReason, SideEffect, SideEffectFailure,
	TokenError, TransportError,
};
pub use headers::build_auth_headers;
pub use provisioning::extract_user_id;
pub use roles::{aggregate_outcomes, requested_scopes, resolve_roles, role_names};
pub use token::{ClientCredentialsTokenSupplier, StaticTokenSupplier, TokenSupplier};
pub use transport::{AdminRequest, AdminResponse, ReqwestTransport, Transport};
pub use types::{
	Attribute, AttributeMap, AuthorizationScope, CredentialOptions, NewUser, RoleOutcome,
	RoleRepresentation, RoleResolution, UserRepresentation,
};

pub use tenantry_common_config::SecretString;
