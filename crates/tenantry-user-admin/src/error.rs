// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the user administration client.
//!
//! [`AdminError`] carries the failures that abort an operation. Failures the
//! client tolerates never appear as `Err`: a [`ScopeFailure`] only surfaces
//! inside [`RoleResolution::Failed`](crate::RoleResolution::Failed), and a
//! [`SideEffectFailure`] is only logged.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::AuthorizationScope;

/// Result type alias for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Fatal errors surfaced to callers.
#[derive(Debug, Error)]
pub enum AdminError {
	/// The token supplier could not produce a usable bearer token.
	#[error("bearer token unavailable: {0}")]
	TokenUnavailable(#[source] TokenError),

	/// An id that would not stay inside its own URL path segment.
	#[error("invalid id for a URL path segment: {0:?}")]
	InvalidPathSegment(String),

	/// The creation response did not identify the new user.
	#[error("could not extract user id from creation response: {0}")]
	IdExtractionFailed(String),

	/// The transport failed before a response arrived.
	#[error("transport error: {0}")]
	Transport(#[from] TransportError),

	/// The identity provider answered with a non-success status.
	#[error("identity provider returned {status}: {message}")]
	Api { status: u16, message: String },

	/// A response body could not be read as the expected record.
	#[error("invalid response from identity provider: {0}")]
	InvalidResponse(String),

	/// The user record's attribute field is not a key to value-list mapping.
	/// Only the strict read reports this.
	#[error("attribute field could not be parsed: {0}")]
	AttributeParseFailed(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),
}

impl AdminError {
	/// HTTP status of an [`AdminError::Api`] failure.
	pub fn status(&self) -> Option<u16> {
		match self {
			AdminError::Api { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub fn is_not_found(&self) -> bool {
		self.status() == Some(404)
	}
}

/// Failures reported by a [`TokenSupplier`](crate::TokenSupplier).
#[derive(Debug, Error)]
pub enum TokenError {
	#[error("token request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("token endpoint returned {status}: {message}")]
	Rejected { status: u16, message: String },

	#[error("token response missing access_token")]
	MissingAccessToken,

	/// The token contains bytes that cannot appear in an HTTP header.
	#[error("token is not a valid header value")]
	Malformed,

	#[error("{0}")]
	Other(String),
}

/// Failures reported by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("HTTP request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("request timed out")]
	Timeout,

	#[error("{0}")]
	Other(String),
}

impl TransportError {
	pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			TransportError::Timeout
		} else {
			TransportError::Request(err)
		}
	}
}

/// Why a single role scope could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFailureReason {
	/// The request could not be built, e.g. for an unusable id.
	InvalidRequest(String),
	/// No response arrived.
	Transport(String),
	/// The identity provider answered with a non-success status.
	Status(u16),
	/// The body was not a list of role records.
	InvalidBody(String),
}

impl fmt::Display for ScopeFailureReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ScopeFailureReason::InvalidRequest(message) => write!(f, "invalid request: {message}"),
			ScopeFailureReason::Transport(message) => write!(f, "transport error: {message}"),
			ScopeFailureReason::Status(status) => write!(f, "status {status}"),
			ScopeFailureReason::InvalidBody(message) => write!(f, "invalid body: {message}"),
		}
	}
}

/// A role lookup that failed for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("role lookup failed for {scope}: {reason}")]
pub struct ScopeFailure {
	pub scope: AuthorizationScope,
	pub reason: ScopeFailureReason,
}

/// The best-effort follow-ups run after a user is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
	SetCredential,
	SendVerifyEmail,
}

impl fmt::Display for SideEffect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SideEffect::SetCredential => f.write_str("set initial credential"),
			SideEffect::SendVerifyEmail => f.write_str("send verification email"),
		}
	}
}

/// A post-creation follow-up that failed. Logged, never returned.
#[derive(Debug, Error)]
#[error("{effect} failed: {source}")]
pub struct SideEffectFailure {
	pub effect: SideEffect,
	#[source]
	pub source: AdminError,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn api_error_exposes_status() {
		let err = AdminError::Api {
			status: 404,
			message: "User not found".to_string(),
		};
		assert_eq!(err.status(), Some(404));
		assert!(err.is_not_found());
		assert!(err.to_string().contains("User not found"));
	}

	#[test]
	fn non_api_errors_have_no_status() {
		let err = AdminError::IdExtractionFailed("no Location header".to_string());
		assert_eq!(err.status(), None);
		assert!(!err.is_not_found());
	}

	#[test]
	fn scope_failure_names_the_scope() {
		let failure = ScopeFailure {
			scope: AuthorizationScope::Client("billing".to_string()),
			reason: ScopeFailureReason::Status(503),
		};
		assert_eq!(
			failure.to_string(),
			"role lookup failed for client 'billing': status 503"
		);
	}

	#[test]
	fn side_effect_failure_keeps_source() {
		let failure = SideEffectFailure {
			effect: SideEffect::SendVerifyEmail,
			source: AdminError::Api {
				status: 500,
				message: "smtp down".to_string(),
			},
		};
		let message = failure.to_string();
		assert!(message.starts_with("send verification email failed"));
		assert!(message.contains("smtp down"));
	}
}
