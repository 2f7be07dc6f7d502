//! Classification of failed exchanges into [`Error`] categories.

use std::sync::Arc;

use serde_json::Value;

use crate::config::ErrorHandlerConfig;
use crate::errors::{ApiError, ErrorKind, PLACEHOLDER_CODE};
use crate::exchange::Response;
use crate::interceptor::ResponseInterceptor;
use crate::transport::{TransportCode, TransportError};
use crate::Error;

pub const NAME: &str = "ErrorHandlerResponseInterceptor";

/// Runs after every other response interceptor.
pub const PRIORITY: i32 = -1000;

pub const CLIENT_ERROR_MESSAGE: &str = "A client error occurred.";
pub const SERVER_ERROR_MESSAGE: &str = "A server error occurred.";
pub const TIMEOUT_MESSAGE: &str = "A timeout error occurred.";
pub const ABORTED_MESSAGE: &str = "A request was aborted.";
pub const NETWORK_MESSAGE: &str = "A network error occurred.";
pub const CLIENT_ERROR_FALLBACK: &str = "base.api.client_error";
pub const SERVER_ERROR_FALLBACK: &str = "base.api.server_error";

/// Body fields probed for a human-readable message, highest priority first:
/// a plain `message`, the RFC 7807 `detail`, then the Hydra `hydra:description`.
const MESSAGE_FIELDS: [&str; 3] = ["message", "detail", "hydra:description"];

/// Response interceptor that turns 4xx/5xx responses and transport failures
/// into typed [`Error`]s.
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler {
    config: ErrorHandlerConfig,
}

impl ErrorHandler {
    /// Creates a handler with the given settings.
    pub fn new(config: ErrorHandlerConfig) -> Self {
        Self { config }
    }

    /// Creates a handler configured from `API_ERRORS_DEBUG`.
    pub fn from_env() -> Self {
        Self::new(ErrorHandlerConfig::from_env())
    }

    pub fn config(&self) -> &ErrorHandlerConfig {
        &self.config
    }

    /// Classifies a response that completed at the transport level.
    ///
    /// 4xx and 5xx statuses become [`Error::Client`] and [`Error::Server`]
    /// with the default messages; everything else is returned unchanged.
    pub fn resolved(&self, response: Response) -> Result<Response, Error> {
        let (kind, message) = if response.is_client_error() {
            (ErrorKind::Client, CLIENT_ERROR_MESSAGE)
        } else if response.is_server_error() {
            (ErrorKind::Server, SERVER_ERROR_MESSAGE)
        } else {
            return Ok(response);
        };
        tracing::trace!(status = response.status, %kind, "classified response");
        Err(Error::classified(
            kind,
            ApiError::from_response(Arc::new(response), message),
        ))
    }

    /// Classifies a transport failure. Always returns an error: either a
    /// classified one wrapping `error`, or `error` itself as
    /// [`Error::Passthrough`] when it cannot be classified.
    pub fn rejected(&self, error: TransportError) -> Error {
        if self.config.debug {
            tracing::debug!(error = ?error, "error handler received transport error");
        }

        let Some(config) = error.config.clone() else {
            return Error::Passthrough(error);
        };

        match error.code {
            Some(TransportCode::TimedOut) => {
                let api_error = ApiError::wrapping(config, TIMEOUT_MESSAGE, error);
                return self.classified(ErrorKind::Timeout, api_error);
            }
            Some(TransportCode::ConnAborted) => {
                let api_error = ApiError::wrapping(config, ABORTED_MESSAGE, error);
                return self.classified(ErrorKind::Aborted, api_error);
            }
            _ => {}
        }

        let (kind, message) = match error.response.as_deref() {
            None => (ErrorKind::Network, NETWORK_MESSAGE.to_string()),
            Some(response) => {
                let (kind, fallback) = if response.is_client_error() {
                    (ErrorKind::Client, CLIENT_ERROR_FALLBACK)
                } else if response.is_server_error() {
                    (ErrorKind::Server, SERVER_ERROR_FALLBACK)
                } else {
                    return Error::Passthrough(error);
                };
                (kind, resolve_message(response.data.as_ref(), fallback).to_string())
            }
        };

        let api_error = ApiError::wrapping(config, &message, error);
        let api_error = match kind {
            ErrorKind::Network => api_error,
            _ => api_error.with_code(PLACEHOLDER_CODE),
        };
        self.classified(kind, api_error)
    }

    fn classified(&self, kind: ErrorKind, error: ApiError) -> Error {
        tracing::trace!(status = ?error.status(), %kind, "classified transport error");
        Error::classified(kind, error)
    }
}

impl ResponseInterceptor for ErrorHandler {
    fn name(&self) -> &str {
        NAME
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn resolved(&self, response: Response) -> Result<Response, Error> {
        ErrorHandler::resolved(self, response)
    }

    fn rejected(&self, error: TransportError) -> Result<Response, Error> {
        Err(ErrorHandler::rejected(self, error))
    }
}

/// Picks the message for an error response body.
///
/// Returns the first of `message`, `detail` and `hydra:description` that is
/// a non-empty string, or `fallback` when none is.
pub fn resolve_message<'a>(data: Option<&'a Value>, fallback: &'a str) -> &'a str {
    data.and_then(|body| {
        MESSAGE_FIELDS.iter().find_map(|field| {
            body.get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
    })
    .unwrap_or(fallback)
}
