//! HTTP client that runs every exchange through a response pipeline.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use api_errors::{
    ErrorHandler, Method, Pipeline, RequestConfig, RequestHandle, Response, ResponseInterceptor,
    TransportCode, TransportError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// HTTP client whose failures come back as classified [`api_errors::Error`]s.
///
/// Every exchange is handed to a [`Pipeline`] that ends with an
/// [`ErrorHandler`]. Extra interceptors can be registered with
/// [`with_interceptor`](Client::with_interceptor).
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    reject_error_status: bool,
    pipeline: Pipeline,
    next_id: AtomicU64,
}

impl Client {
    /// Creates a client with the error handler at the tail of its pipeline.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                ClientError::Build(e)
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            reject_error_status: config.reject_error_status,
            pipeline: Pipeline::with_error_handler(ErrorHandler::new(config.error_handler)),
            next_id: AtomicU64::new(1),
        })
    }

    /// Creates a client with default settings. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Registers an extra response interceptor, ordered by its priority.
    pub fn with_interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: ResponseInterceptor + 'static,
    {
        self.pipeline.register(interceptor);
        self
    }

    /// The response pipeline every exchange runs through.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Url::parse(format!("{}{}", &self.base_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            ClientError::InvalidUrl(e)
        })
    }

    /// Sends a GET request accepting JSON.
    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        let config = RequestConfig::new(Method::Get, self.url(path)?)
            .with_header("accept", "application/json");
        self.execute(config).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: Value) -> Result<Response, ClientError> {
        let config = RequestConfig::new(Method::Post, self.url(path)?)
            .with_header("accept", "application/json")
            .with_body(body);
        self.execute(config).await
    }

    /// Sends a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Response, ClientError> {
        let config = RequestConfig::new(Method::Delete, self.url(path)?);
        self.execute(config).await
    }

    /// Fetches `path` and deserializes the JSON body of a successful response.
    pub async fn get_json<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let resp = self.get(path).await?;
        let data = resp.data.unwrap_or(Value::Null);
        let parsed = serde_json::from_value::<T>(data).map_err(|e| {
            tracing::error!("Failed to parse resource from {}: {}", path, e);
            ClientError::Decode(e)
        })?;
        Ok(parsed)
    }

    /// Sends a request and runs the outcome through the pipeline.
    pub async fn execute(&self, config: RequestConfig) -> Result<Response, ClientError> {
        let request = Arc::new(RequestHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: config.method,
            url: config.url.clone(),
        });
        let config = Arc::new(config);
        tracing::debug!(
            id = request.id,
            method = %request.method,
            url = %request.url,
            "sending request"
        );

        let outcome = self.send(&config, &request).await;
        self.pipeline.complete(outcome).map_err(|e| {
            tracing::warn!(
                id = request.id,
                status = ?e.status(),
                kind = ?e.kind(),
                "Request failed: {}",
                e
            );
            ClientError::Api(e)
        })
    }

    async fn send(
        &self,
        config: &Arc<RequestConfig>,
        request: &Arc<RequestHandle>,
    ) -> Result<Response, TransportError> {
        let mut builder = self
            .http
            .request(to_reqwest_method(config.method), config.url.clone());
        for (name, value) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &config.body {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| transport_error(e, config, request))?;

        let mut response = Response::new(
            resp.status().as_u16(),
            Arc::clone(config),
            Arc::clone(request),
        );
        response.headers = collect_headers(resp.headers());

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                return Err(transport_error(e, config, request).with_response(response));
            }
        };
        response.data = parse_body(&body);

        if self.reject_error_status && !(200..300).contains(&response.status) {
            return Err(TransportError::new(format!(
                "Request failed with status code {}",
                response.status
            ))
            .with_response(response));
        }
        Ok(response)
    }
}

/// Maps a reqwest failure onto the transport codes the error handler understands.
fn transport_code(e: &reqwest::Error) -> Option<TransportCode> {
    if e.is_timeout() {
        Some(TransportCode::TimedOut)
    } else if e.is_body() || e.is_decode() {
        Some(TransportCode::ConnAborted)
    } else if e.is_connect() {
        Some(TransportCode::Other("ECONNREFUSED".to_string()))
    } else {
        None
    }
}

fn transport_error(
    e: reqwest::Error,
    config: &Arc<RequestConfig>,
    request: &Arc<RequestHandle>,
) -> TransportError {
    let mut err = TransportError::new(e.to_string())
        .with_config(Arc::clone(config))
        .with_request(Arc::clone(request));
    if let Some(code) = transport_code(&e) {
        err = err.with_code(code);
    }
    err.with_source(e)
}

/// Last value wins for repeated names; non-ASCII values are skipped.
fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// JSON bodies are parsed; any other non-empty body is kept as a string.
fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}
