// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! URL construction for realm-scoped user resources.
//!
//! Ids and realm names are appended as encoded path segments, so a client id
//! containing `/` or `?` cannot escape its segment. Ids that would be read as
//! dot-segments (`.`, `..`) or that are empty are rejected.

use url::Url;

use crate::config::ConfigError;
use crate::error::AdminError;
use crate::types::AuthorizationScope;

/// Admin endpoints under `{base}/admin/realms/{realm}/users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEndpoints {
	users: Url,
}

impl UserEndpoints {
	pub fn new(base_url: &Url, realm: &str) -> Result<Self, ConfigError> {
		Ok(Self {
			users: extend(base_url, &["admin", "realms", realm, "users"])?,
		})
	}

	/// `POST` target for user creation.
	pub fn collection(&self) -> Url {
		self.users.clone()
	}

	pub fn user(&self, id: &str) -> Result<Url, AdminError> {
		self.join(&[id])
	}

	pub fn realm_composite_roles(&self, id: &str) -> Result<Url, AdminError> {
		self.join(&[id, "role-mappings", "realm", "composite"])
	}

	pub fn client_composite_roles(&self, id: &str, client_id: &str) -> Result<Url, AdminError> {
		self.join(&[id, "role-mappings", "clients", client_id, "composite"])
	}

	pub fn composite_roles(&self, id: &str, scope: &AuthorizationScope) -> Result<Url, AdminError> {
		match scope {
			AuthorizationScope::Realm => self.realm_composite_roles(id),
			AuthorizationScope::Client(client_id) => self.client_composite_roles(id, client_id),
		}
	}

	pub fn reset_password(&self, id: &str) -> Result<Url, AdminError> {
		self.join(&[id, "reset-password"])
	}

	pub fn send_verify_email(&self, id: &str) -> Result<Url, AdminError> {
		self.join(&[id, "send-verify-email"])
	}

	fn join(&self, segments: &[&str]) -> Result<Url, AdminError> {
		if let Some(segment) = segments
			.iter()
			.find(|segment| matches!(**segment, "" | "." | ".."))
		{
			return Err(AdminError::InvalidPathSegment(segment.to_string()));
		}

		let mut url = self.users.clone();
		// `users` was built through path_segments_mut, so it is a base URL.
		if let Ok(mut path) = url.path_segments_mut() {
			path.extend(segments);
		}
		Ok(url)
	}
}

/// OpenID Connect token endpoint of `realm`.
pub fn token_endpoint(base_url: &Url, realm: &str) -> Result<Url, ConfigError> {
	extend(
		base_url,
		&["realms", realm, "protocol", "openid-connect", "token"],
	)
}

fn extend(base_url: &Url, segments: &[&str]) -> Result<Url, ConfigError> {
	let mut url = base_url.clone();
	url.set_query(None);
	url.set_fragment(None);
	url.path_segments_mut()
		.map_err(|_| ConfigError::InvalidBaseUrl {
			url: base_url.to_string(),
			reason: "URL cannot be a base".to_string(),
		})?
		.pop_if_empty()
		.extend(segments);
	Ok(url)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn endpoints(base: &str) -> UserEndpoints {
		UserEndpoints::new(&Url::parse(base).unwrap(), "acme").unwrap()
	}

	#[test]
	fn builds_admin_paths_from_bare_host() {
		let e = endpoints("https://idp.example.com");
		assert_eq!(
			e.collection().as_str(),
			"https://idp.example.com/admin/realms/acme/users"
		);
		assert_eq!(
			e.user("u1").unwrap().as_str(),
			"https://idp.example.com/admin/realms/acme/users/u1"
		);
	}

	#[test]
	fn keeps_path_prefix_and_drops_trailing_slash() {
		let e = endpoints("https://idp.example.com/auth/");
		assert_eq!(
			e.reset_password("u1").unwrap().as_str(),
			"https://idp.example.com/auth/admin/realms/acme/users/u1/reset-password"
		);
	}

	#[test]
	fn role_paths_per_scope() {
		let e = endpoints("https://idp.example.com");
		assert!(e
			.composite_roles("u1", &AuthorizationScope::Realm)
			.unwrap()
			.as_str()
			.ends_with("/users/u1/role-mappings/realm/composite"));
		assert!(e
			.composite_roles("u1", &AuthorizationScope::Client("c-9".to_string()))
			.unwrap()
			.as_str()
			.ends_with("/users/u1/role-mappings/clients/c-9/composite"));
	}

	#[test]
	fn segments_are_encoded() {
		let e = endpoints("https://idp.example.com");
		let url = e.client_composite_roles("u1", "a/b?c").unwrap();
		assert!(url.as_str().ends_with("/clients/a%2Fb%3Fc/composite"));
	}

	#[test]
	fn dot_and_empty_ids_are_rejected() {
		let e = endpoints("https://idp.example.com");

		for id in ["..", ".", ""] {
			assert!(
				matches!(e.user(id), Err(AdminError::InvalidPathSegment(_))),
				"{id:?} should not become a path segment"
			);
			assert!(e.reset_password(id).is_err());
			assert!(e.send_verify_email(id).is_err());
			assert!(e.client_composite_roles("u1", id).is_err());
		}
	}

	#[test]
	fn dots_inside_ids_are_kept() {
		let e = endpoints("https://idp.example.com");
		assert!(e
			.user("ada.lovelace")
			.unwrap()
			.as_str()
			.ends_with("/users/ada.lovelace"));
		assert!(e
			.client_composite_roles("u1", "...")
			.unwrap()
			.as_str()
			.ends_with("/clients/.../composite"));
	}

	#[test]
	fn verify_email_path() {
		let e = endpoints("https://idp.example.com");
		assert!(e
			.send_verify_email("u1")
			.unwrap()
			.as_str()
			.ends_with("/users/u1/send-verify-email"));
	}

	#[test]
	fn token_endpoint_path() {
		let base = Url::parse("https://idp.example.com/").unwrap();
		assert_eq!(
			token_endpoint(&base, "master").unwrap().as_str(),
			"https://idp.example.com/realms/master/protocol/openid-connect/token"
		);
	}
}
