// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! reqwest client builders with the Tenantry User-Agent.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Returns a client builder preconfigured with the Tenantry User-Agent.
///
/// ```ignore
/// let client = tenantry_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Returns a client builder with a caller-chosen User-Agent.
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	Client::builder().user_agent(user_agent.into())
}

/// Builds a client whose requests fail after `timeout`.
pub fn new_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
	builder().timeout(timeout).build()
}

/// The standard User-Agent, `tenantry/{crate version}`.
pub fn user_agent() -> String {
	format!("tenantry/{}", env!("CARGO_PKG_VERSION"))
}
