// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization header construction.

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};

use crate::error::{AdminError, TokenError};
use crate::token::TokenSupplier;

/// Fetches a token and returns `Authorization: Bearer <token>` as the only
/// header. Supplier failures surface as [`AdminError::TokenUnavailable`].
pub async fn build_auth_headers(supplier: &dyn TokenSupplier) -> Result<HeaderMap, AdminError> {
	let token = supplier
		.token()
		.await
		.map_err(AdminError::TokenUnavailable)?;

	let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
		.map_err(|_| AdminError::TokenUnavailable(TokenError::Malformed))?;
	value.set_sensitive(true);

	let mut headers = HeaderMap::with_capacity(1);
	headers.insert(AUTHORIZATION, value);
	Ok(headers)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::token::StaticTokenSupplier;
	use async_trait::async_trait;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tenantry_common_config::SecretString;

	struct FailingSupplier;

	#[async_trait]
	impl TokenSupplier for FailingSupplier {
		async fn token(&self) -> Result<SecretString, TokenError> {
			Err(TokenError::Other("vault sealed".to_string()))
		}
	}

	struct CountingSupplier(AtomicUsize);

	#[async_trait]
	impl TokenSupplier for CountingSupplier {
		async fn token(&self) -> Result<SecretString, TokenError> {
			let n = self.0.fetch_add(1, Ordering::SeqCst);
			Ok(SecretString::new(format!("token-{n}")))
		}
	}

	#[test]
	fn builds_single_bearer_header() {
		let headers =
			tokio_test::block_on(build_auth_headers(&StaticTokenSupplier::new("abc"))).unwrap();

		assert_eq!(headers.len(), 1);
		assert_eq!(headers[AUTHORIZATION], "Bearer abc");
		assert!(headers[AUTHORIZATION].is_sensitive());
	}

	#[test]
	fn supplier_failure_is_token_unavailable() {
		let err = tokio_test::block_on(build_auth_headers(&FailingSupplier)).unwrap_err();
		assert!(matches!(
			err,
			AdminError::TokenUnavailable(TokenError::Other(_))
		));
	}

	#[test]
	fn header_unsafe_token_is_rejected() {
		let supplier = StaticTokenSupplier::new("abc\r\nX-Injected: 1");
		let err = tokio_test::block_on(build_auth_headers(&supplier)).unwrap_err();
		assert!(matches!(
			err,
			AdminError::TokenUnavailable(TokenError::Malformed)
		));
	}

	#[test]
	fn every_call_asks_the_supplier_again() {
		let supplier = CountingSupplier(AtomicUsize::new(0));

		let first = tokio_test::block_on(build_auth_headers(&supplier)).unwrap();
		let second = tokio_test::block_on(build_auth_headers(&supplier)).unwrap();

		assert_eq!(first[AUTHORIZATION], "Bearer token-0");
		assert_eq!(second[AUTHORIZATION], "Bearer token-1");
	}
}
