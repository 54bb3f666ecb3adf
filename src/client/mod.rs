// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated client for the alumni portal API.
//!
//! Handles:
//! - Bearer token attachment from the credential store
//! - Silent access token refresh on 401, at most one refresh at a time
//! - Queueing of requests that hit 401 while a refresh is running
//! - Session teardown and login redirect when the refresh fails

pub mod refresh;
pub mod request;
mod session;

pub use request::{ApiRequest, ApiResponse, RequestBody};

use crate::config::Config;
use crate::error::{AppError, RefreshError, Result};
use crate::middleware::auth::{attach_bearer, bearer, redirect_to_login};
use crate::models::{RefreshRequest, RefreshResponse};
use crate::navigation::Navigator;
use crate::store::{CredentialStore, Credentials};
use refresh::{RefreshCoordinator, Ticket};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Auth endpoint paths, relative to the API base URL.
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const REFRESH: &str = "/auth/refresh";
}

/// Portal API client.
///
/// Cheap to clone; clones share credentials, default headers and the
/// refresh state.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    navigator: Arc<dyn Navigator>,
    /// Headers sent with every intercepted request.
    default_headers: RwLock<HeaderMap>,
    refresh: RefreshCoordinator,
    refresh_timeout: Duration,
}

impl ApiClient {
    /// Create a client over the given credential store and page location.
    pub fn new(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("alumni-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let credentials = Credentials::new(store);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(value) = credentials.access_token().ok().flatten().and_then(|t| bearer(&t)) {
            default_headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                credentials,
                navigator,
                default_headers: RwLock::new(default_headers),
                refresh: RefreshCoordinator::new(),
                refresh_timeout: config.refresh_timeout,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Whether a token refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Number of requests waiting on the in-flight refresh.
    pub fn queued_requests(&self) -> usize {
        self.inner.refresh.queued()
    }

    // ─── Request Dispatch ────────────────────────────────────────────────────

    /// Send a request, recovering once from an expired access token.
    ///
    /// Any non-success response other than a first 401 is returned as
    /// [`AppError::Api`] unchanged.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let sent = self.inner.credentials.access_token().ok().flatten();
        let response = self.dispatch(&request, sent.as_deref()).await?;

        if response.status != StatusCode::UNAUTHORIZED || request.is_retried() {
            return response.error_for_status();
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            "Access token rejected"
        );

        // Renewed by another request while this one was in flight
        if let Some(token) = self.newer_access_token(sent.as_deref()) {
            tracing::debug!(path = %request.path, "Replaying with already renewed token");
            let retry = request.into_retry();
            return self
                .dispatch(&retry, Some(token.as_str()))
                .await?
                .error_for_status();
        }

        let token = self.renewed_access_token().await?;
        let retry = request.into_retry();
        self.dispatch(&retry, Some(token.as_str()))
            .await?
            .error_for_status()
    }

    /// GET `path` and deserialize the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// POST `body` as JSON to `path` and deserialize the response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await?.json()
    }

    /// PUT `body` as JSON to `path` and deserialize the response.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await?.json()
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Perform one HTTP exchange with the interceptor's headers applied.
    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse> {
        let mut headers = self.default_headers();
        headers.extend(request.effective_headers());
        attach_bearer(&mut headers, &self.inner.credentials, token);

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.url(&request.path))
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.bytes.clone());
        }

        let request = builder
            .build()
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
        let response = self.inner.http.execute(request).await?;
        ApiResponse::from_reqwest(response).await
    }

    // ─── Token Refresh ───────────────────────────────────────────────────────

    /// Obtain a new access token, either by running the refresh or by
    /// waiting for the one already in flight.
    async fn renewed_access_token(&self) -> Result<String> {
        let episode = match self.inner.refresh.join() {
            Ticket::Waiter(rx) => return Ok(refresh::wait(rx).await?),
            Ticket::Initiator(episode) => episode,
        };

        match self.refresh_session().await {
            Ok(token) => {
                episode.settle(Ok(token.clone()));
                Ok(token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed, ending session");
                self.end_session();
                episode.settle(Err(err.clone()));
                Err(err.into())
            }
        }
    }

    /// The stored access token, when no refresh is running and it differs
    /// from the one a rejected request was sent with.
    fn newer_access_token(&self, sent: Option<&str>) -> Option<String> {
        if self.inner.refresh.is_refreshing() {
            return None;
        }
        self.inner
            .credentials
            .access_token()
            .ok()
            .flatten()
            .filter(|current| Some(current.as_str()) != sent)
    }

    /// Exchange the stored refresh token and persist the result.
    async fn refresh_session(&self) -> std::result::Result<String, RefreshError> {
        let refresh_token = match self.inner.credentials.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => return Err(RefreshError::MissingRefreshToken),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read refresh token");
                return Err(RefreshError::MissingRefreshToken);
            }
        };

        tracing::info!("Access token expired, refreshing");

        let timeout = self.inner.refresh_timeout;
        let tokens = tokio::time::timeout(timeout, self.request_refresh(&refresh_token))
            .await
            .map_err(|_| RefreshError::TimedOut(timeout))??;

        let rotated = tokens.refresh_token.as_deref().filter(|t| !t.is_empty());
        if let Err(e) = self
            .inner
            .credentials
            .save_refreshed(&tokens.access_token, rotated)
        {
            tracing::warn!(error = %e, "Failed to persist refreshed tokens, continuing");
        }
        self.set_default_authorization(Some(tokens.access_token.as_str()));

        tracing::info!(rotated = rotated.is_some(), "Access token refreshed");
        Ok(tokens.access_token)
    }

    /// Call the refresh endpoint directly, outside the interceptor.
    async fn request_refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<RefreshResponse, RefreshError> {
        let response = self
            .inner
            .http
            .post(self.url(endpoints::REFRESH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let tokens: RefreshResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

        if tokens.access_token.is_empty() {
            return Err(RefreshError::InvalidResponse(
                "empty access token".to_string(),
            ));
        }

        Ok(tokens)
    }

    /// Drop every credential and leave the protected area.
    fn end_session(&self) {
        if let Err(e) = self.inner.credentials.clear() {
            tracing::warn!(error = %e, "Failed to clear credentials");
        }
        self.set_default_authorization(None);
        redirect_to_login(self.inner.navigator.as_ref());
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.inner.base_url, path)
        } else {
            format!("{}/{}", self.inner.base_url, path)
        }
    }

    fn default_headers(&self) -> HeaderMap {
        self.inner
            .default_headers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_default_authorization(&self, token: Option<&str>) {
        let mut headers = self
            .inner
            .default_headers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match token.and_then(bearer) {
            Some(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }
    }
}
