// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page location used for forced redirects when the session ends.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// Pages that need no session. Forced redirects never start from these.
pub const AUTH_PAGES: [&str; 2] = [LOGIN_PATH, REGISTER_PATH];

/// Whether `path` is one of the authentication pages.
pub fn is_auth_page(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    AUTH_PAGES.contains(&path)
}

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
}

/// In-process location that records every navigation.
#[derive(Debug)]
pub struct Location {
    inner: Mutex<LocationInner>,
}

#[derive(Debug)]
struct LocationInner {
    current: String,
    history: Vec<String>,
}

impl Location {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(LocationInner {
                current: initial.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Paths navigated to, oldest first. Does not include the initial path.
    pub fn history(&self) -> Vec<String> {
        self.inner().history.clone()
    }

    fn inner(&self) -> MutexGuard<'_, LocationInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for Location {
    fn current_path(&self) -> String {
        self.inner().current.clone()
    }

    fn navigate(&self, path: &str) {
        tracing::info!(to = path, "Navigating");
        let mut inner = self.inner();
        inner.current = path.to_string();
        inner.history.push(path.to_string());
    }
}
