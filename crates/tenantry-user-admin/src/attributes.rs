// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Custom attribute merging, reading and writing.
//!
//! The user update endpoint replaces the `attributes` field wholesale, so
//! adding attributes is a read-merge-write: fetch what is stored, merge the
//! new pairs over it, and write the full mapping back.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoints::UserEndpoints;
use crate::error::AdminError;
use crate::transport::{AdminRequest, Transport};
use crate::types::{Attribute, AttributeMap};

/// Merges `incoming` over `existing`, last write wins per key.
///
/// A key present in both takes `incoming`'s value list in full; lists are
/// never concatenated. Keys keep the position of their first occurrence.
/// Callers that want to append must pass the old values along with the new.
pub fn merge_attributes<E, I>(existing: E, incoming: I) -> AttributeMap
where
	E: IntoIterator<Item = Attribute>,
	I: IntoIterator<Item = Attribute>,
{
	existing.into_iter().chain(incoming).collect()
}

/// Reads the `attributes` field of a raw user record.
///
/// An absent or `null` field is empty. Anything that is not an object of
/// string lists (or bare strings) is an [`AdminError::AttributeParseFailed`].
pub fn parse_attribute_field(record: &Value) -> Result<Vec<Attribute>, AdminError> {
	match record.get("attributes") {
		None | Some(Value::Null) => Ok(Vec::new()),
		Some(field) => AttributeMap::deserialize(field)
			.map(AttributeMap::into_attributes)
			.map_err(|e| AdminError::AttributeParseFailed(e.to_string())),
	}
}

/// Fetches a user's attributes, reporting every failure.
pub(crate) async fn read_attributes(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: &HeaderMap,
	user_id: &str,
) -> Result<Vec<Attribute>, AdminError> {
	let request = AdminRequest::get(endpoints.user(user_id)?, headers.clone());
	let response = transport.send(request).await?.error_for_status()?;

	let record: Value = response
		.json()
		.map_err(|e| AdminError::AttributeParseFailed(format!("user record is not JSON: {e}")))?;

	parse_attribute_field(&record)
}

/// Fetches a user's attributes, treating any failure as "no attributes".
pub(crate) async fn read_attributes_lenient(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: &HeaderMap,
	user_id: &str,
) -> Vec<Attribute> {
	match read_attributes(transport, endpoints, headers, user_id).await {
		Ok(attributes) => attributes,
		Err(e) => {
			warn!(user_id, error = %e, "Could not read user attributes, treating as empty");
			Vec::new()
		}
	}
}

#[derive(Serialize)]
struct AttributeUpdate<'a> {
	attributes: &'a AttributeMap,
}

/// Read-merge-write of `incoming` onto the stored attributes.
pub(crate) async fn add_attributes(
	transport: &dyn Transport,
	endpoints: &UserEndpoints,
	headers: &HeaderMap,
	user_id: &str,
	incoming: Vec<Attribute>,
) -> Result<AttributeMap, AdminError> {
	let existing = read_attributes_lenient(transport, endpoints, headers, user_id).await;
	let merged = merge_attributes(existing, incoming);

	debug!(user_id, attribute_count = merged.len(), "Writing merged attributes");

	let request = AdminRequest::put(endpoints.user(user_id)?, headers.clone())
		.with_json(&AttributeUpdate {
			attributes: &merged,
		})?;
	transport.send(request).await?.error_for_status()?;

	Ok(merged)
}
