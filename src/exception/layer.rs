use crate::config::ConfigService;
use crate::error::Result;
use crate::exception::{
    Exception, ExceptionFilter, PanicResponder, RaisedException, RestExceptionFilter,
};
use axum::BoxError;
use axum::body::{Body, HttpBody};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::response::Response;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};
use tower_http::catch_panic::CatchPanicLayer;

/// Tower Layer that turns every failure into a filtered error response
///
/// Besides errors and exceptions raised by handlers, it converts 405
/// responses with an empty body, which is how the router answers a method
/// mismatch. A 405 that carries a body was written on purpose and passes
/// through untouched.
///
/// Wrap the whole `Router` so the router's own 405 responses pass through it:
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use simple_exceptions::exception::ExceptionLayer;
/// use tower::Layer;
///
/// # async fn run() {
/// let router = Router::new().route("/users", get(|| async { "ok" }));
/// let app = ExceptionLayer::default().layer(router);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
/// axum::serve(listener, axum::ServiceExt::<axum::extract::Request>::into_make_service(app))
///     .await
///     .unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct ExceptionLayer {
    filter: Arc<dyn ExceptionFilter>,
}

impl Default for ExceptionLayer {
    fn default() -> Self {
        Self::new(RestExceptionFilter::default())
    }
}

impl ExceptionLayer {
    pub fn new<F: ExceptionFilter>(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }

    /// Layer around a [`RestExceptionFilter`] configured from `config`
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        Ok(Self::new(RestExceptionFilter::from_config(config)?))
    }

    /// Panic-catching layer that reports through the same filter
    ///
    /// Install it inside this layer, closest to the handlers.
    pub fn catch_panic_layer(&self) -> CatchPanicLayer<PanicResponder> {
        CatchPanicLayer::custom(PanicResponder::new(self.filter.clone()))
    }
}

impl<S> Layer<S> for ExceptionLayer {
    type Service = ExceptionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionMiddleware {
            inner,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ExceptionMiddleware<S> {
    inner: S,
    filter: Arc<dyn ExceptionFilter>,
}

impl<S> Service<Request<Body>> for ExceptionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Infallible>> {
        // Inner readiness errors surface from `call` instead
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let filter = self.filter.clone();
        let inner = self.inner.clone();

        Box::pin(async move {
            let method = request.method().clone();
            let response = match inner.oneshot(request).await {
                Ok(response) => resolve(filter.as_ref(), &method, response),
                Err(e) => filter.catch(&Exception::from_boxed(e.into())),
            };
            Ok(response)
        })
    }
}

fn resolve(filter: &dyn ExceptionFilter, method: &Method, mut response: Response) -> Response {
    if let Some(RaisedException(exception)) = response.extensions_mut().remove::<RaisedException>() {
        return filter.render(&exception);
    }

    if is_method_mismatch(&response) {
        let supported = parse_allow(response.headers());
        return filter.catch(&Exception::method_not_supported(method.clone(), supported));
    }

    response
}

/// A bare 405 as produced by the router
fn is_method_mismatch(response: &Response) -> bool {
    response.status() == StatusCode::METHOD_NOT_ALLOWED
        && response.body().size_hint().exact() == Some(0)
}

/// Methods listed in the router's `Allow` header; `None` if absent or empty
fn parse_allow(headers: &HeaderMap) -> Option<Vec<Method>> {
    let allow = headers.get(header::ALLOW)?.to_str().ok()?;
    let methods: Vec<Method> = allow
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
        .collect();

    if methods.is_empty() { None } else { Some(methods) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::testing::capture_errors;
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;

    #[test]
    fn test_parse_allow_splits_and_trims() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ALLOW, HeaderValue::from_static("GET,HEAD, POST"));

        assert_eq!(
            parse_allow(&headers),
            Some(vec![Method::GET, Method::HEAD, Method::POST])
        );
    }

    #[test]
    fn test_parse_allow_empty_is_unknown() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_allow(&headers), None);

        headers.insert(header::ALLOW, HeaderValue::from_static(""));
        assert_eq!(parse_allow(&headers), None);
    }

    #[test]
    fn test_resolve_leaves_successful_responses() {
        let filter = RestExceptionFilter::default();
        let response = Response::new(Body::from("hello"));

        let resolved = resolve(&filter, &Method::GET, response);
        assert_eq!(resolved.status(), StatusCode::OK);
    }

    #[test]
    fn test_resolve_converts_bare_method_not_allowed() {
        let filter = RestExceptionFilter::default();
        let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("GET,HEAD"));

        let resolved = resolve(&filter, &Method::PUT, response);
        assert_eq!(resolved.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resolved.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(resolved.headers().get(header::ALLOW).unwrap(), "GET, HEAD");
    }

    #[test]
    fn test_resolve_keeps_handler_written_method_not_allowed() {
        let filter = RestExceptionFilter::default();
        let response = (StatusCode::METHOD_NOT_ALLOWED, "read-only mirror").into_response();

        let resolved = resolve(&filter, &Method::POST, response);
        assert_eq!(resolved.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resolved.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_raised_exception_is_logged_once() {
        let filter = RestExceptionFilter::default();

        let (resolved, logs) = capture_errors(|| {
            let response = Exception::unhandled("db password=hunter2").into_response();
            resolve(&filter, &Method::GET, response)
        });
        assert_eq!(resolved.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resolved.extensions().get::<RaisedException>().is_none());
        assert_eq!(logs.matches("hunter2").count(), 1);
    }
}
