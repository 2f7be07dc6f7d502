//! Typed classification of failed HTTP exchanges.
//!
//! [`ErrorHandler`] is a response interceptor meant to sit at the tail of a
//! [`Pipeline`]. It turns 4xx/5xx responses and transport failures into an
//! [`Error`] that keeps the original request and response around.
mod config;
mod errors;
mod exchange;
mod handler;
mod interceptor;
mod pipeline;
mod transport;
pub use self::config::{parse_bool, ErrorHandlerConfig, DEBUG_ENV};
pub use self::errors::{ApiError, Error, ErrorKind, PLACEHOLDER_CODE};
pub use self::exchange::{Method, RequestConfig, RequestHandle, Response};
pub use self::handler::{
    resolve_message, ErrorHandler, ABORTED_MESSAGE, CLIENT_ERROR_FALLBACK, CLIENT_ERROR_MESSAGE,
    NAME, NETWORK_MESSAGE, PRIORITY, SERVER_ERROR_FALLBACK, SERVER_ERROR_MESSAGE,
    TIMEOUT_MESSAGE,
};
pub use self::interceptor::{InterceptorType, ResponseInterceptor};
pub use self::pipeline::Pipeline;
pub use self::transport::{TransportCode, TransportError};
