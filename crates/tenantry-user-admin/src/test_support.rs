// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scripted in-memory transport for engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::LOCATION;
use http::{HeaderValue, Method, StatusCode};
use url::Url;

use crate::endpoints::UserEndpoints;
use crate::error::TransportError;
use crate::transport::{AdminRequest, AdminResponse, Transport};

pub(crate) const BASE_URL: &str = "https://idp.test";
pub(crate) const REALM: &str = "acme";

pub(crate) fn endpoints() -> UserEndpoints {
	UserEndpoints::new(&Url::parse(BASE_URL).unwrap(), REALM).unwrap()
}

/// Path of `url` relative to the users collection, e.g. `/u1/reset-password`.
pub(crate) fn users_path(suffix: &str) -> String {
	format!("/admin/realms/{REALM}/users{suffix}")
}

#[derive(Clone)]
enum Reply {
	Respond(AdminResponse),
	Fail(String),
}

#[derive(Clone)]
struct Route {
	reply: Reply,
	delay: Duration,
}

/// Answers requests by method and path. Unscripted routes get a 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
	routes: Mutex<HashMap<(Method, String), Route>>,
	requests: Mutex<Vec<AdminRequest>>,
	in_flight: AtomicUsize,
	max_in_flight: AtomicUsize,
}

impl FakeTransport {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn json(
		self,
		method: Method,
		path: &str,
		status: u16,
		body: serde_json::Value,
	) -> Self {
		let mut response = AdminResponse::new(status_code(status));
		response.body = Bytes::from(body.to_string());
		self.route(method, path, Reply::Respond(response), Duration::ZERO)
	}

	pub(crate) fn status(self, method: Method, path: &str, status: u16) -> Self {
		self.route(
			method,
			path,
			Reply::Respond(AdminResponse::new(status_code(status))),
			Duration::ZERO,
		)
	}

	pub(crate) fn created(self, path: &str, location: &str) -> Self {
		let mut response = AdminResponse::new(StatusCode::CREATED);
		if let Ok(value) = HeaderValue::from_str(location) {
			response.headers.insert(LOCATION, value);
		}
		self.route(Method::POST, path, Reply::Respond(response), Duration::ZERO)
	}

	pub(crate) fn fail(self, method: Method, path: &str, message: &str) -> Self {
		self.route(
			method,
			path,
			Reply::Fail(message.to_string()),
			Duration::ZERO,
		)
	}

	/// Delays the already scripted reply for `path`.
	pub(crate) fn delayed(self, method: Method, path: &str, delay: Duration) -> Self {
		if let Some(route) = self
			.routes
			.lock()
			.unwrap()
			.get_mut(&(method, path.to_string()))
		{
			route.delay = delay;
		}
		self
	}

	fn route(self, method: Method, path: &str, reply: Reply, delay: Duration) -> Self {
		self.routes
			.lock()
			.unwrap()
			.insert((method, path.to_string()), Route { reply, delay });
		self
	}

	pub(crate) fn requests(&self) -> Vec<AdminRequest> {
		self.requests.lock().unwrap().clone()
	}

	pub(crate) fn requests_to(&self, method: Method, path: &str) -> Vec<AdminRequest> {
		self.requests()
			.into_iter()
			.filter(|r| r.method == method && r.url.path() == path)
			.collect()
	}

	pub(crate) fn max_in_flight(&self) -> usize {
		self.max_in_flight.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Transport for FakeTransport {
	async fn send(&self, request: AdminRequest) -> Result<AdminResponse, TransportError> {
		let key = (request.method.clone(), request.url.path().to_string());
		self.requests.lock().unwrap().push(request);

		let route = self.routes.lock().unwrap().get(&key).cloned();

		let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_in_flight.fetch_max(now, Ordering::SeqCst);

		if let Some(route) = &route {
			if !route.delay.is_zero() {
				tokio::time::sleep(route.delay).await;
			}
		}

		self.in_flight.fetch_sub(1, Ordering::SeqCst);

		match route.map(|r| r.reply) {
			Some(Reply::Respond(response)) => Ok(response),
			Some(Reply::Fail(message)) => Err(TransportError::Other(message)),
			None => Ok(AdminResponse::new(StatusCode::NOT_FOUND)),
		}
	}
}

fn status_code(status: u16) -> StatusCode {
	StatusCode::from_u16(status).unwrap()
}
