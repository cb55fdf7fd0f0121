// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pluggable HTTP transport.
//!
//! The engines only see [`Transport`]: a request goes in, a settled response
//! or a [`TransportError`] comes out. Timeouts and connection policy belong
//! to the implementation. [`ReqwestTransport`] is the default.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::LOCATION;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::config::{ConfigError, UserAdminConfig};
use crate::error::{AdminError, TransportError};

/// One admin API call.
#[derive(Debug, Clone)]
pub struct AdminRequest {
	pub method: Method,
	pub url: Url,
	pub headers: HeaderMap,
	pub body: Option<serde_json::Value>,
}

impl AdminRequest {
	pub fn new(method: Method, url: Url, headers: HeaderMap) -> Self {
		Self {
			method,
			url,
			headers,
			body: None,
		}
	}

	pub fn get(url: Url, headers: HeaderMap) -> Self {
		Self::new(Method::GET, url, headers)
	}

	pub fn post(url: Url, headers: HeaderMap) -> Self {
		Self::new(Method::POST, url, headers)
	}

	pub fn put(url: Url, headers: HeaderMap) -> Self {
		Self::new(Method::PUT, url, headers)
	}

	/// Attaches a JSON body.
	pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
		self.body = Some(serde_json::to_value(body)?);
		Ok(self)
	}
}

/// A settled response, success or not.
#[derive(Debug, Clone)]
pub struct AdminResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl AdminResponse {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// The `Location` header, if present and valid UTF-8.
	pub fn location(&self) -> Option<&str> {
		self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
	}

	pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
		serde_json::from_slice(&self.body)
	}

	pub fn text_lossy(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Converts a non-success response into [`AdminError::Api`].
	pub(crate) fn into_api_error(self) -> AdminError {
		AdminError::Api {
			status: self.status.as_u16(),
			message: self.text_lossy(),
		}
	}

	/// Passes success responses through and turns the rest into errors.
	pub(crate) fn error_for_status(self) -> Result<Self, AdminError> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(self.into_api_error())
		}
	}
}

/// Sends admin requests to the identity provider.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, request: AdminRequest) -> Result<AdminResponse, TransportError>;
}

/// [`Transport`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	pub fn new(client: reqwest::Client) -> Self {
		Self { client }
	}

	/// Builds a client with the configured timeout and User-Agent.
	pub fn from_config(config: &UserAdminConfig) -> Result<Self, ConfigError> {
		let builder = match &config.user_agent {
			Some(user_agent) => tenantry_common_http::builder_with_user_agent(user_agent.clone()),
			None => tenantry_common_http::builder(),
		};
		let client = builder.timeout(config.request_timeout).build()?;
		Ok(Self::new(client))
	}
}

#[async_trait]
impl Transport for ReqwestTransport {
	async fn send(&self, request: AdminRequest) -> Result<AdminResponse, TransportError> {
		debug!(method = %request.method, url = %request.url, "Sending admin request");

		let mut builder = self
			.client
			.request(request.method, request.url)
			.headers(request.headers);
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		let response = builder.send().await.map_err(TransportError::from_reqwest)?;

		let status = response.status();
		let headers = response.headers().clone();
		let body = response
			.bytes()
			.await
			.map_err(TransportError::from_reqwest)?;

		trace!(status = %status, body_len = body.len(), "Received admin response");

		Ok(AdminResponse {
			status,
			headers,
			body,
		})
	}
}
