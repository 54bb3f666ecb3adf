// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the session and the auth endpoints.

pub mod auth;
pub mod session;

pub use auth::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
pub use session::{Session, UserSummary, UserType};
