use crate::exception::Exception;
use crate::interceptor::{Interceptor, Next};
use axum::BoxError;
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Tower Layer for invoking a chain of Interceptors
///
/// The first interceptor in the list runs outermost. A rejected request
/// leaves the chain as `Err(Exception)`, so put an `ExceptionLayer` outside
/// of this one.
#[derive(Clone)]
pub struct InterceptorLayer {
    interceptors: Arc<Vec<Box<dyn Interceptor>>>,
}

impl InterceptorLayer {
    pub fn new(interceptors: Vec<Box<dyn Interceptor>>) -> Self {
        Self {
            interceptors: Arc::new(interceptors),
        }
    }
}

impl<S> Layer<S> for InterceptorLayer {
    type Service = InterceptorMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptorMiddleware {
            inner,
            interceptors: self.interceptors.clone(),
        }
    }
}

#[derive(Clone)]
pub struct InterceptorMiddleware<S> {
    inner: S,
    interceptors: Arc<Vec<Box<dyn Interceptor>>>,
}

impl<S> Service<Request<Body>> for InterceptorMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response;
    type Error = Exception;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness of the inner service is awaited inside the chain
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let interceptors = self.interceptors.clone();
        let inner = self.inner.clone();

        Box::pin(async move {
            // Innermost link: the wrapped service
            let mut chain = Next::new(move |req| {
                Box::pin(async move {
                    inner
                        .oneshot(req)
                        .await
                        .map_err(|e| Exception::from_boxed(e.into()))
                })
            });

            // Wrap in reverse so interceptors[0] ends up outermost
            for i in (0..interceptors.len()).rev() {
                let interceptors = interceptors.clone();
                let next = chain;
                chain = Next::new(move |req| {
                    Box::pin(async move { interceptors[i].intercept(req, next).await })
                });
            }

            chain.run(request).await
        })
    }
}
