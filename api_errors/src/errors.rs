//! Classified error types raised for failed exchanges.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use crate::exchange::{RequestConfig, RequestHandle, Response};
use crate::transport::TransportError;

/// Error code attached to 4xx/5xx errors.
pub const PLACEHOLDER_CODE: &str = "0";

/// Category of a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Client,
    Server,
    Timeout,
    Aborted,
    Network,
}

impl ErrorKind {
    /// Conventional type name, e.g. `ClientError`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Client => "ClientError",
            Self::Server => "ServerError",
            Self::Timeout => "TimeoutError",
            Self::Aborted => "AbortedError",
            Self::Network => "NetworkError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload shared by every classified error.
///
/// Holds the exchange context by reference count so the caller can inspect
/// the original request and response without re-fetching anything.
#[derive(Debug)]
pub struct ApiError {
    message: String,
    status: Option<u16>,
    code: Option<String>,
    config: Arc<RequestConfig>,
    request: Option<Arc<RequestHandle>>,
    response: Option<Arc<Response>>,
    cause: Option<TransportError>,
    backtrace: Backtrace,
}

impl ApiError {
    /// Builds an error from a received response. Status, config and request
    /// are all taken from the response.
    pub fn from_response(response: Arc<Response>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(response.status),
            code: Some(PLACEHOLDER_CODE.to_string()),
            config: Arc::clone(&response.config),
            request: Some(Arc::clone(&response.request)),
            response: Some(response),
            cause: None,
            backtrace: Backtrace::capture(),
        }
    }

    /// Builds an error wrapping a transport failure that carries a config.
    pub(crate) fn wrapping(
        config: Arc<RequestConfig>,
        message: &str,
        cause: TransportError,
    ) -> Self {
        Self {
            message: message.to_string(),
            status: cause.status(),
            code: cause.code.as_ref().map(|c| c.to_string()),
            config,
            request: cause.request.clone(),
            response: cause.response.clone(),
            cause: Some(cause),
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn request(&self) -> Option<&RequestHandle> {
        self.request.as_deref()
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_deref()
    }

    /// The transport error this one was classified from.
    pub fn cause(&self) -> Option<&TransportError> {
        self.cause.as_ref()
    }

    /// Call-site backtrace. Empty unless backtraces are enabled at runtime.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Outcome of classifying a failed exchange.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The server rejected the request (HTTP 4xx).
    #[error(transparent)]
    Client(ApiError),
    /// The server failed to handle the request (HTTP 5xx).
    #[error(transparent)]
    Server(ApiError),
    #[error(transparent)]
    Timeout(ApiError),
    #[error(transparent)]
    Aborted(ApiError),
    /// No response was received at all.
    #[error(transparent)]
    Network(ApiError),
    /// A failure outside the known categories, returned untouched.
    #[error(transparent)]
    Passthrough(TransportError),
}

impl Error {
    pub(crate) fn classified(kind: ErrorKind, error: ApiError) -> Self {
        match kind {
            ErrorKind::Client => Self::Client(error),
            ErrorKind::Server => Self::Server(error),
            ErrorKind::Timeout => Self::Timeout(error),
            ErrorKind::Aborted => Self::Aborted(error),
            ErrorKind::Network => Self::Network(error),
        }
    }

    /// Category of the error, `None` for a passthrough.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Client(_) => Some(ErrorKind::Client),
            Self::Server(_) => Some(ErrorKind::Server),
            Self::Timeout(_) => Some(ErrorKind::Timeout),
            Self::Aborted(_) => Some(ErrorKind::Aborted),
            Self::Network(_) => Some(ErrorKind::Network),
            Self::Passthrough(_) => None,
        }
    }

    /// Shared payload of a classified error.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Client(e)
            | Self::Server(e)
            | Self::Timeout(e)
            | Self::Aborted(e)
            | Self::Network(e) => Some(e),
            Self::Passthrough(_) => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Passthrough(e) => &e.message,
            _ => self.api_error().map(ApiError::message).unwrap_or_default(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Passthrough(e) => e.status(),
            _ => self.api_error().and_then(ApiError::status),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Passthrough(e) => e.code.as_ref().map(|c| c.as_str()),
            _ => self.api_error().and_then(ApiError::code),
        }
    }

    pub fn config(&self) -> Option<&RequestConfig> {
        match self {
            Self::Passthrough(e) => e.config.as_deref(),
            _ => self.api_error().map(ApiError::config),
        }
    }

    pub fn request(&self) -> Option<&RequestHandle> {
        match self {
            Self::Passthrough(e) => e.request.as_deref(),
            _ => self.api_error().and_then(ApiError::request),
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Passthrough(e) => e.response.as_deref(),
            _ => self.api_error().and_then(ApiError::response),
        }
    }

    /// The underlying transport error: the wrapped cause of a classified
    /// error, or the passthrough itself.
    pub fn cause(&self) -> Option<&TransportError> {
        match self {
            Self::Passthrough(e) => Some(e),
            _ => self.api_error().and_then(ApiError::cause),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Method;
    use crate::transport::TransportCode;
    use url::Url;

    fn response(status: u16) -> Arc<Response> {
        let url = Url::parse("https://api.example.com/orders/1").unwrap();
        let config = Arc::new(RequestConfig::new(Method::Get, url.clone()));
        let request = Arc::new(RequestHandle {
            id: 3,
            method: Method::Get,
            url,
        });
        Arc::new(Response::new(status, config, request))
    }

    #[test]
    fn from_response_keeps_context() {
        let resp = response(409);
        let err = ApiError::from_response(Arc::clone(&resp), "conflict");
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.code(), Some(PLACEHOLDER_CODE));
        assert_eq!(err.config().url.path(), "/orders/1");
        assert_eq!(err.request().map(|r| r.id), Some(3));
        assert!(std::ptr::eq(err.response().unwrap(), resp.as_ref()));
        assert!(err.cause().is_none());
    }

    #[test]
    fn wrapping_takes_code_and_response_from_cause() {
        let resp = response(500);
        let cause = TransportError::new("socket hang up")
            .with_code(TransportCode::ConnAborted)
            .with_response((*resp).clone());
        let config = cause.config.clone().unwrap();
        let err = ApiError::wrapping(config, "A request was aborted.", cause);
        assert_eq!(err.code(), Some("ECONNABORTED"));
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.cause().unwrap().message, "socket hang up");
    }

    #[test]
    fn display_is_message() {
        let err = Error::Server(ApiError::from_response(response(502), "upstream down"));
        insta::assert_snapshot!(err.to_string(), @"upstream down");
        assert_eq!(err.kind(), Some(ErrorKind::Server));
        assert_eq!(ErrorKind::Server.to_string(), "ServerError");
    }

    #[test]
    fn passthrough_exposes_original() {
        let err = Error::Passthrough(
            TransportError::new("weird").with_code(TransportCode::Other("EPROTO".into())),
        );
        assert!(err.is_passthrough());
        assert_eq!(err.kind(), None);
        assert_eq!(err.code(), Some("EPROTO"));
        assert_eq!(err.message(), "weird");
        assert!(err.config().is_none());
        insta::assert_snapshot!(err.to_string(), @"weird (EPROTO)");
    }
}
