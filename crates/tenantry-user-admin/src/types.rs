// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Data model for realm users, custom attributes and role lookups.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tenantry_common_config::SecretString;
use tracing::warn;

use crate::error::ScopeFailure;

// =============================================================================
// Users
// =============================================================================

/// A realm account as the identity provider represents it.
///
/// Built by callers without an `id`; the identity provider assigns one on
/// creation. Fields the client does not model are kept in `extra` and written
/// back unchanged. Passwords never appear here, see [`NewUser`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default)]
	pub username: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub enabled: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email_verified: Option<bool>,
	/// `None` when absent or unreadable.
	/// [`try_get_attributes`](crate::UserAdminClient::try_get_attributes)
	/// reports why.
	#[serde(
		default,
		deserialize_with = "lenient_attributes",
		skip_serializing_if = "Option::is_none"
	)]
	pub attributes: Option<AttributeMap>,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

fn lenient_attributes<'de, D>(deserializer: D) -> Result<Option<AttributeMap>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(raw.and_then(|value| match AttributeMap::deserialize(&value) {
		Ok(map) => Some(map),
		Err(e) => {
			warn!(error = %e, "Ignoring unreadable user attributes");
			None
		}
	}))
}

/// A user to be created, with its optional initial password.
///
/// ```
/// use tenantry_user_admin::NewUser;
///
/// let user = NewUser::new("ada")
///     .with_email("ada@example.com")
///     .with_password("initial-pass")
///     .with_attribute("department", ["research"]);
/// assert_eq!(user.profile.username, "ada");
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewUser {
	pub profile: UserRepresentation,
	pub password: Option<SecretString>,
}

impl NewUser {
	pub fn new(username: impl Into<String>) -> Self {
		Self {
			profile: UserRepresentation {
				username: username.into(),
				enabled: Some(true),
				..Default::default()
			},
			password: None,
		}
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.profile.email = Some(email.into());
		self
	}

	pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
		self.profile.first_name = Some(first_name.into());
		self
	}

	pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
		self.profile.last_name = Some(last_name.into());
		self
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.profile.enabled = Some(enabled);
		self
	}

	pub fn with_password(mut self, password: impl Into<SecretString>) -> Self {
		self.password = Some(password.into());
		self
	}

	/// Sets a custom attribute, replacing any earlier value for the key.
	pub fn with_attribute<I, V>(mut self, key: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<String>,
	{
		self.profile
			.attributes
			.get_or_insert_with(AttributeMap::new)
			.upsert(Attribute::new(key, values));
		self
	}

	/// Splits the password from the profile that gets submitted for creation.
	pub fn into_parts(self) -> (Option<SecretString>, UserRepresentation) {
		(self.password, self.profile)
	}
}

// =============================================================================
// Attributes
// =============================================================================

/// One custom attribute: a key holding an ordered list of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
	pub key: String,
	pub value: Vec<String>,
}

impl Attribute {
	pub fn new<I, V>(key: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<String>,
	{
		Self {
			key: key.into(),
			value: values.into_iter().map(Into::into).collect(),
		}
	}

	pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: vec![value.into()],
		}
	}
}

/// Ordered key to value-list mapping with unique keys.
///
/// Keys keep the position of their first insertion. Inserting an existing key
/// replaces its whole value list; values are never concatenated. Serializes
/// as a JSON object in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
	entries: Vec<Attribute>,
}

impl AttributeMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&[String]> {
		self.entries
			.iter()
			.find(|entry| entry.key == key)
			.map(|entry| entry.value.as_slice())
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Inserts or replaces the attribute's key.
	pub fn upsert(&mut self, attribute: Attribute) {
		match self.entries.iter_mut().find(|entry| entry.key == attribute.key) {
			Some(entry) => entry.value = attribute.value,
			None => self.entries.push(attribute),
		}
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|entry| entry.key.as_str())
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
		self.entries.iter()
	}

	pub fn into_attributes(self) -> Vec<Attribute> {
		self.entries
	}
}

impl FromIterator<Attribute> for AttributeMap {
	fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
		let mut map = AttributeMap::new();
		for attribute in iter {
			map.upsert(attribute);
		}
		map
	}
}

impl IntoIterator for AttributeMap {
	type Item = Attribute;
	type IntoIter = std::vec::IntoIter<Attribute>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

impl<'a> IntoIterator for &'a AttributeMap {
	type Item = &'a Attribute;
	type IntoIter = std::slice::Iter<'a, Attribute>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

impl Serialize for AttributeMap {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for entry in &self.entries {
			map.serialize_entry(&entry.key, &entry.value)?;
		}
		map.end()
	}
}

/// The identity provider stores lists, but hand-edited records sometimes
/// carry a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum AttributeValues {
	Many(Vec<String>),
	One(String),
}

impl From<AttributeValues> for Vec<String> {
	fn from(values: AttributeValues) -> Self {
		match values {
			AttributeValues::Many(values) => values,
			AttributeValues::One(value) => vec![value],
		}
	}
}

impl<'de> Deserialize<'de> for AttributeMap {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct AttributeMapVisitor;

		impl<'de> Visitor<'de> for AttributeMapVisitor {
			type Value = AttributeMap;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("an object mapping attribute keys to lists of strings")
			}

			fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
			where
				A: MapAccess<'de>,
			{
				let mut map = AttributeMap::new();
				while let Some((key, values)) = access.next_entry::<String, AttributeValues>()? {
					map.upsert(Attribute {
						key,
						value: values.into(),
					});
				}
				Ok(map)
			}
		}

		deserializer.deserialize_map(AttributeMapVisitor)
	}
}

// =============================================================================
// Roles
// =============================================================================

/// Where a set of role mappings lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthorizationScope {
	/// The realm-level role set.
	Realm,
	/// Roles defined by one client, addressed by the client's internal id.
	Client(String),
}

impl fmt::Display for AuthorizationScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AuthorizationScope::Realm => f.write_str("realm"),
			AuthorizationScope::Client(id) => write!(f, "client '{id}'"),
		}
	}
}

/// A role record from a role-mapping endpoint. Only `name` is needed for
/// resolution; the rest is kept for callers that inspect raw records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub composite: Option<bool>,
	#[serde(default)]
	pub client_role: Option<bool>,
	#[serde(default)]
	pub container_id: Option<String>,
}

/// The settled result of looking up one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleOutcome {
	Resolved {
		scope: AuthorizationScope,
		roles: Vec<String>,
	},
	Failed(ScopeFailure),
}

impl RoleOutcome {
	pub fn is_resolved(&self) -> bool {
		matches!(self, RoleOutcome::Resolved { .. })
	}
}

/// What a role lookup across several scopes produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleResolution {
	/// At least one scope answered. Role names from every answering scope, in
	/// request order, duplicates included. Failed scopes are dropped.
	Roles(Vec<String>),
	/// No scope answered. One failure per requested scope.
	Failed(Vec<ScopeFailure>),
}

impl RoleResolution {
	pub fn roles(&self) -> Option<&[String]> {
		match self {
			RoleResolution::Roles(roles) => Some(roles),
			RoleResolution::Failed(_) => None,
		}
	}

	pub fn failures(&self) -> &[ScopeFailure] {
		match self {
			RoleResolution::Roles(_) => &[],
			RoleResolution::Failed(failures) => failures,
		}
	}

	pub fn has_role(&self, name: &str) -> bool {
		self.roles()
			.is_some_and(|roles| roles.iter().any(|role| role == name))
	}

	pub fn into_result(self) -> Result<Vec<String>, Vec<ScopeFailure>> {
		match self {
			RoleResolution::Roles(roles) => Ok(roles),
			RoleResolution::Failed(failures) => Err(failures),
		}
	}
}

// =============================================================================
// Credentials
// =============================================================================

/// Options for the initial password set during creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialOptions {
	/// Whether the user must replace the password at first login.
	pub temporary: bool,
}

impl CredentialOptions {
	pub fn temporary() -> Self {
		Self { temporary: true }
	}
}

/// Body of the reset-password call.
#[derive(Serialize)]
pub(crate) struct CredentialRepresentation<'a> {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub value: &'a str,
	pub temporary: bool,
}
