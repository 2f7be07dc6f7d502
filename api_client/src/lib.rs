//! Client layer: a `reqwest`-backed HTTP client whose failures are classified
//! by the `api_errors` error handler.
//!
//! Re-exports the `api_errors` crate so callers can match on
//! [`api_errors::Error`] without a separate dependency.

pub mod client;
pub mod config;
pub mod error;

pub use api_errors;
pub use api_errors::{Error, ErrorKind};

pub use client::Client;
pub use config::ClientConfig;
pub use error::ClientError;
