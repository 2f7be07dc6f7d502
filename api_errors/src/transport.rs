//! Failures reported by the transport layer before any classification.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::exchange::{RequestConfig, RequestHandle, Response};

/// Low-level failure reason reported by the transport, distinct from an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportCode {
    /// `ETIMEDOUT`
    TimedOut,
    /// `ECONNABORTED`
    ConnAborted,
    Other(String),
}

impl TransportCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::TimedOut => "ETIMEDOUT",
            Self::ConnAborted => "ECONNABORTED",
            Self::Other(code) => code,
        }
    }
}

impl FromStr for TransportCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ETIMEDOUT" => Self::TimedOut,
            "ECONNABORTED" => Self::ConnAborted,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for TransportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced by the transport for a failed exchange.
///
/// Any of the exchange parts may be missing: a failure raised before a
/// request was configured carries no config, a connection failure carries
/// no response.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub message: String,
    pub code: Option<TransportCode>,
    pub config: Option<Arc<RequestConfig>>,
    pub request: Option<Arc<RequestHandle>>,
    pub response: Option<Arc<Response>>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            config: None,
            request: None,
            response: None,
            source: None,
        }
    }

    pub fn with_code(mut self, code: TransportCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_config(mut self, config: Arc<RequestConfig>) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_request(mut self, request: Arc<RequestHandle>) -> Self {
        self.request = Some(request);
        self
    }

    /// Attaches the response. The response's own config and request fill in
    /// whichever of the two are still missing.
    pub fn with_response(mut self, response: Response) -> Self {
        if self.config.is_none() {
            self.config = Some(Arc::clone(&response.config));
        }
        if self.request.is_none() {
            self.request = Some(Arc::clone(&response.request));
        }
        self.response = Some(Arc::new(response));
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// HTTP status of the attached response, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(e) => Some(e.as_ref()),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Method;
    use url::Url;

    #[test]
    fn code_parses_known_and_unknown() {
        assert_eq!("ETIMEDOUT".parse::<TransportCode>(), Ok(TransportCode::TimedOut));
        assert_eq!(
            "ECONNABORTED".parse::<TransportCode>(),
            Ok(TransportCode::ConnAborted)
        );
        assert_eq!(
            "ECONNRESET".parse::<TransportCode>(),
            Ok(TransportCode::Other("ECONNRESET".into()))
        );
        assert_eq!(TransportCode::Other("EPIPE".into()).to_string(), "EPIPE");
    }

    #[test]
    fn response_fills_missing_context() {
        let url = Url::parse("https://api.example.com/a").unwrap();
        let config = Arc::new(RequestConfig::new(Method::Get, url.clone()));
        let request = Arc::new(RequestHandle {
            id: 7,
            method: Method::Get,
            url,
        });
        let resp = Response::new(502, Arc::clone(&config), Arc::clone(&request));

        let err = TransportError::new("bad gateway").with_response(resp);
        assert!(Arc::ptr_eq(err.config.as_ref().unwrap(), &config));
        assert!(Arc::ptr_eq(err.request.as_ref().unwrap(), &request));
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn display_includes_code() {
        let err =
            TransportError::new("timeout of 100ms exceeded").with_code(TransportCode::TimedOut);
        assert_eq!(err.to_string(), "timeout of 100ms exceeded (ETIMEDOUT)");
        assert_eq!(TransportError::new("boom").to_string(), "boom");
    }

    #[test]
    fn source_is_chained() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::new("connect failed").with_source(io);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "refused");
    }
}
