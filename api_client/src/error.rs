//! Error types for the client layer.

/// Errors produced by [`crate::Client`], wrapping classified exchange
/// failures and adding setup and decoding failures.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The exchange failed; inspect the classified error for kind and status.
    #[error(transparent)]
    Api(#[from] api_errors::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to build HTTP client")]
    Build(#[source] reqwest::Error),
    /// A successful body did not match the expected type.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
}

impl ClientError {
    /// The classified exchange error, if that is what this is.
    pub fn api(&self) -> Option<&api_errors::Error> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}
