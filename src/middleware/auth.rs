// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token attachment and the forced login redirect.

use crate::navigation::{is_auth_page, Navigator, LOGIN_PATH};
use crate::store::Credentials;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Build an `Authorization: Bearer <token>` header value.
///
/// Returns `None` for tokens that cannot be carried in a header.
pub fn bearer(token: &str) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).ok()?;
    value.set_sensitive(true);
    Some(value)
}

/// Outbound interceptor: set the bearer header from `token`, or from the
/// credential store when no token is given.
///
/// Never fails. Without a usable token the headers are left untouched and
/// the request goes out unauthenticated.
pub fn attach_bearer(headers: &mut HeaderMap, credentials: &Credentials, token: Option<&str>) {
    let stored;
    let token = match token {
        Some(token) => token,
        None => match credentials.access_token() {
            Ok(Some(token)) => {
                stored = token;
                stored.as_str()
            }
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read access token, sending request without it");
                return;
            }
        },
    };

    match bearer(token) {
        Some(value) => {
            headers.insert(AUTHORIZATION, value);
        }
        None => tracing::warn!("Access token is not a valid header value, not attaching it"),
    }
}

/// Send the user to the login page unless they are already on an
/// authentication page. Returns whether a navigation happened.
pub fn redirect_to_login(navigator: &dyn Navigator) -> bool {
    let current = navigator.current_path();
    if is_auth_page(&current) {
        tracing::debug!(current = %current, "Already on an auth page, not redirecting");
        return false;
    }

    tracing::info!(from = %current, "Session ended, redirecting to login");
    navigator.navigate(LOGIN_PATH);
    true
}
