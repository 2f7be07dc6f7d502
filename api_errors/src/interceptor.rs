//! The hook contract shared by every response interceptor.

use crate::exchange::Response;
use crate::transport::TransportError;
use crate::Error;

/// Which half of the exchange an interceptor is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorType {
    Request,
    Response,
}

/// A hook run for every completed exchange.
///
/// Interceptors run in descending [`priority`](ResponseInterceptor::priority)
/// order, so a negative priority places an interceptor towards the tail.
pub trait ResponseInterceptor: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> InterceptorType {
        InterceptorType::Response
    }

    fn priority(&self) -> i32 {
        0
    }

    /// Called with a response the transport considered successful.
    fn resolved(&self, response: Response) -> Result<Response, Error> {
        Ok(response)
    }

    /// Called with a transport failure. Returning `Ok` recovers the exchange;
    /// returning [`Error::Passthrough`] hands the error on unchanged.
    fn rejected(&self, error: TransportError) -> Result<Response, Error> {
        Err(Error::Passthrough(error))
    }
}
