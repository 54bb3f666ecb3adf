// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CREDENTIALS_PATH: &str = ".alumni-portal/credentials.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 15;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the portal API, without trailing slash
    pub api_base_url: String,
    /// JSON file backing the credential store (CLI only)
    pub credentials_path: PathBuf,
    /// Transport timeout applied to every HTTP call
    pub request_timeout: Duration,
    /// Upper bound on a single token refresh call
    pub refresh_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("PORTAL_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing("PORTAL_API_URL"))?;
        if api_base_url.is_empty() {
            return Err(ConfigError::Missing("PORTAL_API_URL"));
        }

        Ok(Self {
            api_base_url,
            credentials_path: env::var("PORTAL_CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            request_timeout: Duration::from_secs(secs_from_env(
                "PORTAL_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            refresh_timeout: Duration::from_secs(secs_from_env(
                "PORTAL_REFRESH_TIMEOUT_SECS",
                DEFAULT_REFRESH_TIMEOUT_SECS,
            )),
        })
    }
}

fn secs_from_env(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
