// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, logout and read access to the stored session.

use super::{endpoints, ApiClient, ApiResponse};
use crate::error::Result;
use crate::models::{LoginRequest, LoginResponse, Session, UserSummary};
use crate::navigation::LOGIN_PATH;

impl ApiClient {
    /// Sign in and store the new session.
    ///
    /// Sent outside the interceptor: a 401 here means bad credentials and is
    /// returned as an ordinary API error.
    pub async fn login(&self, phone: &str, password: &str) -> Result<Session> {
        let response = self
            .inner
            .http
            .post(self.url(endpoints::LOGIN))
            .json(&LoginRequest { phone, password })
            .send()
            .await?;

        let login: LoginResponse = ApiResponse::from_reqwest(response)
            .await?
            .error_for_status()?
            .json()?;

        let session = Session {
            access_token: login.access_token,
            refresh_token: login.refresh_token,
            user: login.user,
        };

        self.inner.credentials.save_session(&session)?;
        self.set_default_authorization(Some(session.access_token.as_str()));

        tracing::info!(
            user_id = session.user.id,
            user_type = ?session.user.user_type,
            "Logged in"
        );
        Ok(session)
    }

    /// Clear the session and go to the login page.
    ///
    /// Always navigates, even when already logged out or already on the
    /// login page. A storage failure is reported after navigating.
    pub fn logout(&self) -> Result<()> {
        let cleared = self.inner.credentials.clear();
        self.set_default_authorization(None);

        tracing::info!("Logged out");
        self.inner.navigator.navigate(LOGIN_PATH);
        cleared
    }

    pub fn session(&self) -> Result<Option<Session>> {
        self.inner.credentials.session()
    }

    pub fn current_user(&self) -> Result<Option<UserSummary>> {
        self.inner.credentials.user()
    }

    /// Whether an access token is stored. Says nothing about its validity.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.inner.credentials.access_token(), Ok(Some(_)))
    }
}
