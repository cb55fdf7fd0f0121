// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effective role resolution across realm and client scopes.
//!
//! Role mappings live under one sub-resource per scope and the admin API has
//! no bulk endpoint, so resolution fans out one request per scope and joins
//! on all of them settling. Each request resolves to a [`RoleOutcome`]; a
//! slow or failing scope neither blocks nor spoils the others.
//!
//! Reduction is "any success wins": if at least one scope answered, the
//! result is every answering scope's role names, and failures are dropped.
//! Only when nothing answered are the failures handed back, one per scope.

use futures::future::join_all;
use http::HeaderMap;
use tracing::{debug, instrument};

use crate::endpoints::UserEndpoints;
use crate::error::{ScopeFailure, ScopeFailureReason};
use crate::transport::{AdminRequest, Transport};
use crate::types::{AuthorizationScope, RoleOutcome, RoleRepresentation, RoleResolution};

/// The scopes to query, realm first, then clients in the given order.
pub fn requested_scopes(client_ids: &[String], include_realm: bool) -> Vec<AuthorizationScope> {
	let realm = include_realm.then_some(AuthorizationScope::Realm);
	realm
		.into_iter()
		.chain(client_ids.iter().cloned().map(AuthorizationScope::Client))
		.collect()
}

/// Looks up composite roles for every requested scope concurrently.
#[instrument(skip_all, fields(user_id = %user_id, client_count = client_ids.len(), include_realm = include_realm))]
pub async fn resolve_roles(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: &HeaderMap,
	user_id: &str,
	client_ids: &[String],
	include_realm: bool,
) -> RoleResolution {
	let scopes = requested_scopes(client_ids, include_realm);
	let lookups = scopes
		.into_iter()
		.map(|scope| lookup_scope(transport, endpoints, headers.clone(), user_id, scope));

	let outcomes = join_all(lookups).await;
	aggregate_outcomes(outcomes)
}

/// Fetches one scope. Never fails: every problem becomes a
/// [`RoleOutcome::Failed`].
async fn lookup_scope(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: HeaderMap,
	user_id: &str,
	scope: AuthorizationScope,
) -> RoleOutcome {
	let url = match endpoints.composite_roles(user_id, &scope) {
		Ok(url) => url,
		Err(e) => {
			let reason = ScopeFailureReason::InvalidRequest(e.to_string());
			return RoleOutcome::Failed(ScopeFailure { scope, reason });
		}
	};
	let request = AdminRequest::get(url, headers);

	let reason = match transport.send(request).await {
		Err(e) => ScopeFailureReason::Transport(e.to_string()),
		Ok(response) if !response.is_success() => {
			ScopeFailureReason::Status(response.status.as_u16())
		}
		Ok(response) => match response.json::<Vec<RoleRepresentation>>() {
			Ok(records) => {
				return RoleOutcome::Resolved {
					scope,
					roles: role_names(records),
				}
			}
			Err(e) => ScopeFailureReason::InvalidBody(e.to_string()),
		},
	};

	RoleOutcome::Failed(ScopeFailure { scope, reason })
}

/// Projects role names out of role records. Nameless records are skipped.
pub fn role_names(records: Vec<RoleRepresentation>) -> Vec<String> {
	records.into_iter().filter_map(|record| record.name).collect()
}

/// Reduces settled outcomes to a single resolution.
///
/// - at least one success: [`RoleResolution::Roles`] with the successful
///   scopes' names flattened in outcome order, duplicates kept
/// - no success: [`RoleResolution::Failed`] with every failure as-is
/// - no outcomes: an empty [`RoleResolution::Roles`]
pub fn aggregate_outcomes(outcomes: Vec<RoleOutcome>) -> RoleResolution {
	let (resolved, failed): (Vec<_>, Vec<_>) =
		outcomes.into_iter().partition(RoleOutcome::is_resolved);

	if resolved.is_empty() && !failed.is_empty() {
		let failures: Vec<ScopeFailure> = failed
			.into_iter()
			.filter_map(|outcome| match outcome {
				RoleOutcome::Failed(failure) => Some(failure),
				RoleOutcome::Resolved { .. } => None,
			})
			.collect();
		debug!(failed = failures.len(), "No role scope answered");
		return RoleResolution::Failed(failures);
	}

	for outcome in &failed {
		if let RoleOutcome::Failed(failure) = outcome {
			debug!(scope = %failure.scope, reason = %failure.reason, "Dropping failed role scope");
		}
	}

	let roles = resolved
		.into_iter()
		.flat_map(|outcome| match outcome {
			RoleOutcome::Resolved { roles, .. } => roles,
			RoleOutcome::Failed(_) => Vec::new(),
		})
		.collect();
	RoleResolution::Roles(roles)
}
