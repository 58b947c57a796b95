use crate::exception::{Exception, ExceptionFilter};
use axum::body::Body;
use axum::http::Response;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tower_http::catch_panic::ResponseForPanic;

/// A handler panicked while processing the request
#[derive(Debug, Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanic(pub String);

impl HandlerPanic {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic payload".to_string()
        };
        Self(detail)
    }
}

/// Renders panics through an [`ExceptionFilter`] as uncaught errors
///
/// Use with `tower_http::catch_panic::CatchPanicLayer::custom`, or get a ready
/// layer from `ExceptionLayer::catch_panic_layer`.
#[derive(Clone)]
pub struct PanicResponder {
    filter: Arc<dyn ExceptionFilter>,
}

impl PanicResponder {
    pub fn new(filter: Arc<dyn ExceptionFilter>) -> Self {
        Self { filter }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let panic = HandlerPanic::from_payload(err.as_ref());
        self.filter.catch(&Exception::unhandled(panic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::RestExceptionFilter;
    use crate::exception::testing::capture_errors;
    use axum::http::StatusCode;

    #[test]
    fn test_panic_payload_is_masked() {
        let mut responder = PanicResponder::new(Arc::new(RestExceptionFilter::default()));

        let (response, logs) = capture_errors(|| {
            responder.response_for_panic(Box::new("index out of bounds".to_string()))
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs.contains("Unhandled exception in application!"));
        assert!(logs.contains("index out of bounds"));
    }

    #[test]
    fn test_payload_detail_extraction() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(HandlerPanic::from_payload(owned.as_ref()).0, "owned");
        assert_eq!(HandlerPanic::from_payload(borrowed.as_ref()).0, "borrowed");
        assert_eq!(
            HandlerPanic::from_payload(other.as_ref()).0,
            "unknown panic payload"
        );
    }
}
