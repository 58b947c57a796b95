//! Request guards that fail with an [`Exception`]
//!
//! An interceptor runs around the handlers and may abort the request by
//! returning an exception. `InterceptorLayer` passes the exception on as the
//! service error, and an `ExceptionLayer` outside it renders the response.

use crate::exception::Exception;
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;

pub mod layer;

pub use layer::{InterceptorLayer, InterceptorMiddleware};

/// Outcome of an interceptor or the rest of its chain
pub type InterceptorResult = Result<Response, Exception>;

type BoxedRun =
    Box<dyn FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>> + Send>;

/// The rest of the chain, ending at the wrapped service
pub struct Next {
    run: BoxedRun,
}

impl Next {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: FnOnce(Request<Body>) -> Pin<Box<dyn Future<Output = InterceptorResult> + Send>>
            + Send
            + 'static,
    {
        Self { run: Box::new(f) }
    }

    pub async fn run(self, request: Request<Body>) -> InterceptorResult {
        (self.run)(request).await
    }
}

/// Inspects a request before the handler and may reject it
///
/// Errors from the wrapped service arrive through [`Next::run`] already
/// recovered into their most specific [`Exception`].
///
/// # Example
/// ```
/// use simple_exceptions::exception::{ApiError, Exception};
/// use simple_exceptions::interceptor::{Interceptor, InterceptorResult, Next};
/// use simple_exceptions::async_trait;
/// use axum::{body::Body, http::{Request, StatusCode}};
///
/// struct RequireApiKey;
///
/// #[async_trait]
/// impl Interceptor for RequireApiKey {
///     async fn intercept(&self, req: Request<Body>, next: Next) -> InterceptorResult {
///         if !req.headers().contains_key("x-api-key") {
///             return Err(ApiError::from_status(StatusCode::UNAUTHORIZED, "Missing API key").into());
///         }
///         next.run(req).await
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult;
}
