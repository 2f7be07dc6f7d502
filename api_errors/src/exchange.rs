//! Exchange context: the request configuration, the dispatched request and the response.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// HTTP method of an outgoing request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        };
        write!(f, "{}", s)
    }
}

/// Configuration of an outgoing request, as handed to the transport.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: Method,
    pub url: Url,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Upper bound for the whole exchange. `None` leaves it to the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestConfig {
    /// Creates a config with no headers, body or timeout.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            timeout: None,
            body: None,
        }
    }

    /// Sets a header. Names are stored lowercased.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Overrides the transport's default timeout for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the JSON request body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The request as it was actually dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHandle {
    /// Sequence number assigned by the sending client.
    pub id: u64,
    pub method: Method,
    pub url: Url,
}

/// A received HTTP response together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    /// Response headers keyed by lowercased name. Only the last value of a
    /// repeated header (e.g. `set-cookie`) is kept, and values that are not
    /// visible ASCII are dropped.
    pub headers: BTreeMap<String, String>,
    /// Body, parsed as JSON when possible. `None` when the body was empty.
    pub data: Option<Value>,
    pub config: Arc<RequestConfig>,
    pub request: Arc<RequestHandle>,
}

impl Response {
    /// Creates a response with no headers and no body.
    pub fn new(status: u16, config: Arc<RequestConfig>, request: Arc<RequestHandle>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            data: None,
            config,
            request,
        }
    }

    /// Sets the parsed body.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets a header. Names are stored lowercased.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Status in `[400, 500)`.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Status in `[500, 600)`.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Arc<RequestConfig> {
        Arc::new(RequestConfig::new(
            Method::Get,
            Url::parse("https://api.example.com/items").unwrap(),
        ))
    }

    fn handle() -> Arc<RequestHandle> {
        Arc::new(RequestHandle {
            id: 1,
            method: Method::Get,
            url: Url::parse("https://api.example.com/items").unwrap(),
        })
    }

    #[test]
    fn status_ranges() {
        let resp = Response::new(404, config(), handle());
        assert!(resp.is_client_error());
        assert!(!resp.is_server_error());

        let resp = Response::new(599, config(), handle());
        assert!(resp.is_server_error());

        let resp = Response::new(600, config(), handle());
        assert!(!resp.is_client_error());
        assert!(!resp.is_server_error());
    }

    #[test]
    fn headers_are_lowercased() {
        let cfg = RequestConfig::new(Method::Post, Url::parse("https://x.test/").unwrap())
            .with_header("Content-Type", "application/json");
        assert_eq!(
            cfg.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn method_serializes_uppercase() {
        let json = serde_json::to_string(&Method::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}
