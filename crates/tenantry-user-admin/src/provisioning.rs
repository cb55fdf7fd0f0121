// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User creation with best-effort follow-ups.
//!
//! Creating the record is the only step whose failure is returned. Seeding
//! the password and sending the verification email run afterwards,
//! concurrently, and their failures are logged at `warn`.

use http::HeaderMap;
use tenantry_common_config::SecretString;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::endpoints::UserEndpoints;
use crate::error::{AdminError, SideEffect, SideEffectFailure};
use crate::transport::{AdminRequest, Transport};
use crate::types::{CredentialOptions, CredentialRepresentation, NewUser};

/// Creates `user` and returns the id the identity provider assigned.
#[instrument(skip_all, fields(username = %user.profile.username, temporary = options.temporary))]
pub async fn provision_user(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: &HeaderMap,
	user: NewUser,
	options: CredentialOptions,
) -> Result<String, AdminError> {
	let (password, profile) = user.into_parts();

	let request = AdminRequest::post(endpoints.collection(), headers.clone()).with_json(&profile)?;
	let response = transport.send(request).await?.error_for_status()?;

	let location = response.location().ok_or_else(|| {
		AdminError::IdExtractionFailed("creation response has no Location header".to_string())
	})?;
	let user_id = extract_user_id(location)?;

	info!(user_id = %user_id, "User created");

	let (credential, verification) = futures::join!(
		set_initial_credential(transport, endpoints, headers, &user_id, password, options),
		send_verify_email(transport, endpoints, headers, &user_id),
	);

	for failure in [credential.err(), verification.err()].into_iter().flatten() {
		warn!(
			user_id = %user_id,
			effect = %failure.effect,
			error = %failure.source,
			"Post-creation step failed; account exists and the step can be retried"
		);
	}

	Ok(user_id)
}

/// The last path segment of a `Location` value.
///
/// Accepts absolute and relative references; ignores a trailing slash, the
/// query and the fragment.
pub fn extract_user_id(location: &str) -> Result<String, AdminError> {
	let path = match Url::parse(location) {
		Ok(url) => url.path().to_string(),
		Err(_) => location
			.split(['?', '#'])
			.next()
			.unwrap_or_default()
			.to_string(),
	};

	match path.trim_end_matches('/').rsplit('/').next() {
		Some(id) if !matches!(id, "" | "." | "..") && !id.contains(':') => Ok(id.to_string()),
		_ => Err(AdminError::IdExtractionFailed(format!(
			"no user id in location '{location}'"
		))),
	}
}

async fn set_initial_credential(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: &HeaderMap,
	user_id: &str,
	password: Option<SecretString>,
	options: CredentialOptions,
) -> Result<(), SideEffectFailure> {
	let Some(password) = password else {
		debug!(user_id, "No initial password supplied, skipping credential");
		return Ok(());
	};

	let body = CredentialRepresentation {
		kind: "password",
		value: password.expose(),
		temporary: options.temporary,
	};

	let request = endpoints.reset_password(user_id).and_then(|url| {
		AdminRequest::put(url, headers.clone())
			.with_json(&body)
			.map_err(AdminError::from)
	});

	side_effect(SideEffect::SetCredential, transport, request).await
}

async fn send_verify_email(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: &HeaderMap,
	user_id: &str,
) -> Result<(), SideEffectFailure> {
	let request = endpoints
		.send_verify_email(user_id)
		.map(|url| AdminRequest::put(url, headers.clone()));

	side_effect(SideEffect::SendVerifyEmail, transport, request).await
}

async fn side_effect(
	effect: SideEffect,
	transport: &dyn Transport,
	request: Result<AdminRequest, AdminError>,
) -> Result<(), SideEffectFailure> {
	let attempt = async {
		let response = transport.send(request?).await?;
		response.error_for_status()?;
		Ok::<(), AdminError>(())
	};

	attempt
		.await
		.map_err(|source| SideEffectFailure { effect, source })
}
