// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by Tenantry crates.
//!
//! - [`Secret`] / [`SecretString`]: redacting wrapper for tokens, client
//!   secrets and passwords
//! - [`load_secret_env`] and friends: environment lookups with `*_FILE`
//!   support for mounted secrets

pub mod env;
pub mod secret;

pub use env::{
	load_env, load_secret_env, parse_env, require_env, require_secret_env, RequiredEnvError,
	SecretEnvError,
};
pub use secret::{Secret, SecretString, REDACTED};
