//! Client settings, read from code or from the environment.

use std::time::Duration;

use api_errors::ErrorHandlerConfig;

use crate::error::ClientError;

pub const BASE_URL_ENV: &str = "API_CLIENT_BASE_URL";
pub const TIMEOUT_ENV: &str = "API_CLIENT_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "API_CLIENT_USER_AGENT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for [`crate::Client`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Prefix for every request path, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Default timeout for a whole exchange. Per-request timeouts override it.
    pub timeout: Duration,
    pub user_agent: String,
    /// Hand non-2xx responses to the failure path, where the body message is
    /// resolved. When off, they reach the success path and get the default
    /// messages instead.
    pub reject_error_status: bool,
    pub error_handler: ErrorHandlerConfig,
}

impl ClientConfig {
    /// Settings for `base_url` with a 30 second timeout and the debug log off.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            reject_error_status: true,
            error_handler: ErrorHandlerConfig::default(),
        }
    }

    /// Loads `.env` if present, then reads the settings from the environment.
    /// Only the base URL is required.
    pub fn from_env() -> Result<Self, ClientError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to load .env file: {}", e);
            }
        }
        let base_url =
            std::env::var(BASE_URL_ENV).map_err(|_| ClientError::MissingEnv(BASE_URL_ENV))?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(env_u64(TIMEOUT_ENV, DEFAULT_TIMEOUT_SECS)),
            user_agent: std::env::var(USER_AGENT_ENV).unwrap_or_else(|_| default_user_agent()),
            reject_error_status: true,
            error_handler: ErrorHandlerConfig::from_env(),
        })
    }

    /// Sets the default timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Turns the raw-error debug log on or off.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.error_handler.debug = debug;
        self
    }

    /// Chooses which path non-2xx responses take.
    pub fn with_reject_error_status(mut self, reject: bool) -> Self {
        self.reject_error_status = reject;
        self
    }
}

fn default_user_agent() -> String {
    format!("api_client/{}", env!("CARGO_PKG_VERSION"))
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}
