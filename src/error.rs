// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the client, the credential store and the CLI.

use reqwest::StatusCode;
use std::time::Duration;

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport failure (connection refused, DNS, transport timeout).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status. Surfaced unchanged.
    #[error("HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// The access token expired and could not be renewed. The session is gone.
    #[error("Session expired: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential store error: {0}")]
    Storage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for a 401 that reached the caller, i.e. a request that was
    /// already replayed once with a fresh token and was still rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// True when a failed refresh ended the session (credentials were
    /// cleared). An abandoned refresh leaves the session in place.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::Refresh(e) if *e != RefreshError::Abandoned)
    }
}

/// Why a refresh episode failed.
///
/// Cloned into every request that was queued behind the refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh endpoint returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Refresh request failed: {0}")]
    Network(String),

    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),

    #[error("Refresh timed out after {0:?}")]
    TimedOut(Duration),

    /// The task driving the refresh was dropped before it settled.
    #[error("Refresh was abandoned before completing")]
    Abandoned,
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;
