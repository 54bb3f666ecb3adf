// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent credential store.
//!
//! Provides:
//! - A flat string-keyed storage trait (local-storage semantics)
//! - In-memory and JSON-file backends
//! - [`Credentials`], the typed adapter that owns the key names

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{Session, UserSummary};
use std::sync::Arc;

/// Storage key names.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    /// Older clients stored the access token here. Still mirrored on write.
    pub const LEGACY_ACCESS_TOKEN: &str = "authToken";
    pub const REFRESH_TOKEN: &str = "refreshToken";
    /// JSON-serialized `UserSummary`
    pub const USER: &str = "user";

    pub const ALL: [&str; 4] = [ACCESS_TOKEN, LEGACY_ACCESS_TOKEN, REFRESH_TOKEN, USER];
}

/// Flat string-keyed storage.
///
/// Operations are synchronous and cheap; implementations must be safe to
/// call from any task.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Typed view over a [`CredentialStore`].
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn CredentialStore>,
}

impl Credentials {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Current access token.
    ///
    /// Falls back to the legacy key when the canonical one is absent, and
    /// copies the value over so the fallback is only taken once.
    pub fn access_token(&self) -> Result<Option<String>> {
        if let Some(token) = self.get_non_empty(keys::ACCESS_TOKEN)? {
            return Ok(Some(token));
        }

        let Some(legacy) = self.get_non_empty(keys::LEGACY_ACCESS_TOKEN)? else {
            return Ok(None);
        };

        tracing::debug!("Migrating access token from legacy storage key");
        self.store.set(keys::ACCESS_TOKEN, &legacy)?;
        Ok(Some(legacy))
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.get_non_empty(keys::REFRESH_TOKEN)
    }

    /// Stored user summary. A corrupt entry is reported and treated as absent.
    pub fn user(&self) -> Result<Option<UserSummary>> {
        let Some(raw) = self.get_non_empty(keys::USER)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user entry is not valid JSON, ignoring");
                Ok(None)
            }
        }
    }

    /// Full session, if every part of it is present.
    pub fn session(&self) -> Result<Option<Session>> {
        let (Some(access_token), Some(refresh_token), Some(user)) =
            (self.access_token()?, self.refresh_token()?, self.user()?)
        else {
            return Ok(None);
        };

        Ok(Some(Session {
            access_token,
            refresh_token,
            user,
        }))
    }

    /// Persist a freshly created session under all keys.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;

        self.save_access_token(&session.access_token)?;
        self.store.set(keys::REFRESH_TOKEN, &session.refresh_token)?;
        self.store.set(keys::USER, &user)?;
        Ok(())
    }

    /// Persist the result of a token refresh.
    ///
    /// The refresh token is only replaced when the server rotated it.
    pub fn save_refreshed(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()> {
        self.save_access_token(access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.store.set(keys::REFRESH_TOKEN, refresh_token)?;
        }
        Ok(())
    }

    /// Remove every credential entry.
    ///
    /// Attempts all keys even if one fails, then reports the first failure.
    pub fn clear(&self) -> Result<()> {
        let mut first_err = None;
        for key in keys::ALL {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove credential entry");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn save_access_token(&self, access_token: &str) -> Result<()> {
        self.store.set(keys::ACCESS_TOKEN, access_token)?;
        self.store.set(keys::LEGACY_ACCESS_TOKEN, access_token)
    }

    fn get_non_empty(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key)?.filter(|v| !v.is_empty()))
    }
}
