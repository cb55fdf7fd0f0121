// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared HTTP client construction for Tenantry.
//!
//! Every outbound request from the admin client identifies itself with the
//! same User-Agent so identity-provider access logs can attribute traffic.

mod client;

pub use client::{builder, builder_with_user_agent, new_client_with_timeout, user_agent};
