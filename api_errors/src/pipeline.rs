//! Ordered chain of response interceptors.

use crate::exchange::Response;
use crate::interceptor::{InterceptorType, ResponseInterceptor};
use crate::transport::TransportError;
use crate::{Error, ErrorHandler};

/// Response interceptors sorted by descending priority.
///
/// Interceptors with equal priority keep their registration order.
#[derive(Default)]
pub struct Pipeline {
    interceptors: Vec<Box<dyn ResponseInterceptor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pipeline holding only the given error handler.
    pub fn with_error_handler(handler: ErrorHandler) -> Self {
        Self::new().with(handler)
    }

    pub fn with<I>(mut self, interceptor: I) -> Self
    where
        I: ResponseInterceptor + 'static,
    {
        self.register(interceptor);
        self
    }

    /// Adds an interceptor. Request interceptors are ignored with a warning.
    pub fn register<I>(&mut self, interceptor: I)
    where
        I: ResponseInterceptor + 'static,
    {
        if interceptor.kind() != InterceptorType::Response {
            tracing::warn!(
                name = interceptor.name(),
                "ignoring non-response interceptor"
            );
            return;
        }
        let priority = interceptor.priority();
        let at = self
            .interceptors
            .iter()
            .position(|i| i.priority() < priority)
            .unwrap_or(self.interceptors.len());
        self.interceptors.insert(at, Box::new(interceptor));
    }

    /// Names of the registered interceptors in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs a successful response through every interceptor. The first
    /// error stops the chain.
    pub fn resolve(&self, response: Response) -> Result<Response, Error> {
        self.interceptors
            .iter()
            .try_fold(response, |response, i| i.resolved(response))
    }

    /// Runs a transport failure through the interceptors.
    ///
    /// A passthrough is handed to the next interceptor; a recovered response
    /// or a classified error ends the chain.
    pub fn reject(&self, error: TransportError) -> Result<Response, Error> {
        let mut error = error;
        for interceptor in &self.interceptors {
            match interceptor.rejected(error) {
                Err(Error::Passthrough(next)) => error = next,
                other => {
                    tracing::trace!(name = interceptor.name(), "interceptor settled exchange");
                    return other;
                }
            }
        }
        Err(Error::Passthrough(error))
    }

    /// Dispatches a finished exchange to [`resolve`](Self::resolve) or
    /// [`reject`](Self::reject).
    pub fn complete(&self, outcome: Result<Response, TransportError>) -> Result<Response, Error> {
        match outcome {
            Ok(response) => self.resolve(response),
            Err(error) => self.reject(error),
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("interceptors", &self.names())
            .finish()
    }
}
