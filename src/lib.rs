// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Alumni Portal: authenticated client for the alumni portal API
//!
//! This crate provides the HTTP client layer behind the portal: bearer token
//! attachment, silent access token refresh with request queueing, and
//! session teardown when the refresh token is no longer accepted.

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod services;
pub mod store;

pub use client::{ApiClient, ApiRequest, ApiResponse};
pub use config::Config;
pub use error::{AppError, RefreshError, Result};
