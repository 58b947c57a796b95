//! Error taxonomy and the filter that turns it into responses
//!
//! Anything that aborts a request is represented as an [`Exception`]. An
//! [`ExceptionFilter`] decides how each exception is rendered; the built-in
//! [`RestExceptionFilter`] produces `{ "message": ... }` bodies with the
//! status codes below.
//!
//! | Exception | Status | Message |
//! |---|---|---|
//! | `Api` | error's own | error's own |
//! | `NotReadable` | 400 | configured, detail logged |
//! | `Bind` / `MethodArgumentNotValid` | 400 | failure messages joined by `\n` |
//! | `MethodNotSupported` | 405 | `Method X not allowed. Allowed methods: A, B.` |
//! | `MediaTypeNotSupported` | 415 | `Content type 'x' not supported` |
//! | `Unhandled` | 500 | configured, detail logged |

use crate::validation::ValidationFailures;
use axum::BoxError;
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use thiserror::Error;

pub mod api;
pub mod classified;
pub mod http;
pub mod layer;
pub mod panic;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, ApiException};
pub use classified::{ClassifiedError, ErrorKind};
pub use http::RestExceptionFilter;
pub(crate) use http::log_exception;
pub use layer::{ExceptionLayer, ExceptionMiddleware};
pub use panic::{HandlerPanic, PanicResponder};

/// The ExceptionFilter trait
///
/// Filters handle errors thrown during request processing.
/// They must return a valid Response.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    fn catch(&self, exception: &Exception) -> Response;

    /// Render an exception that was already logged where it was raised
    ///
    /// `ExceptionMiddleware` uses this for exceptions a handler returned,
    /// since `Exception::into_response` logs them. Filters whose `catch`
    /// logs should override it to skip that step.
    fn render(&self, exception: &Exception) -> Response {
        self.catch(exception)
    }
}

/// Anything that aborted normal request processing
#[derive(Debug, Error)]
pub enum Exception {
    /// Raised on purpose by application code
    #[error("{0}")]
    Api(Box<dyn ApiException>),

    /// The request body could not be parsed into the expected shape
    #[error("Can't read request message: {0}")]
    NotReadable(#[source] BoxError),

    /// Binding request parameters into a target object collected failures
    #[error("{0}")]
    Bind(ValidationFailures),

    /// Validating a handler argument collected failures
    #[error("{0}")]
    MethodArgumentNotValid(ValidationFailures),

    #[error("Request method '{method}' is not supported")]
    MethodNotSupported {
        method: Method,
        /// `None` when the router did not report what it accepts
        supported: Option<Vec<Method>>,
    },

    #[error("{}", media_type_description(.content_type.as_deref()))]
    MediaTypeNotSupported {
        content_type: Option<String>,
        /// Media types the extractor accepts, reported in the log
        supported: Vec<String>,
    },

    /// Anything else
    #[error("Unhandled exception: {0}")]
    Unhandled(#[source] BoxError),
}

pub(crate) fn media_type_description(content_type: Option<&str>) -> String {
    format!("Content type '{}' not supported", content_type.unwrap_or_default())
}

impl Exception {
    pub fn api(error: impl ApiException) -> Self {
        Self::Api(Box::new(error))
    }

    pub fn not_readable(error: impl Into<BoxError>) -> Self {
        Self::NotReadable(error.into())
    }

    pub fn unhandled(error: impl Into<BoxError>) -> Self {
        Self::Unhandled(error.into())
    }

    pub fn method_not_supported(method: Method, supported: Option<Vec<Method>>) -> Self {
        Self::MethodNotSupported { method, supported }
    }

    pub fn media_type_not_supported(content_type: Option<String>, supported: Vec<String>) -> Self {
        Self::MediaTypeNotSupported {
            content_type,
            supported,
        }
    }

    /// Category this exception is handled as
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(_) => ErrorKind::Api,
            Self::NotReadable(_) => ErrorKind::NotReadable,
            Self::Bind(_) => ErrorKind::Bind,
            Self::MethodArgumentNotValid(_) => ErrorKind::MethodArgumentNotValid,
            Self::MethodNotSupported { .. } => ErrorKind::MethodNotAllowed,
            Self::MediaTypeNotSupported { .. } => ErrorKind::UnsupportedMediaType,
            Self::Unhandled(_) => ErrorKind::Unhandled,
        }
    }

    /// Recover the most specific exception from a type-erased error
    ///
    /// Errors that are none of the recognized types become [`Exception::Unhandled`].
    pub fn from_boxed(error: BoxError) -> Self {
        let error = match error.downcast::<Exception>() {
            Ok(exception) => return *exception,
            Err(error) => error,
        };
        let error = match error.downcast::<ApiError>() {
            Ok(api) => return Self::Api(api),
            Err(error) => error,
        };
        let error = match error.downcast::<JsonRejection>() {
            Ok(rejection) => return Self::from(*rejection),
            Err(error) => error,
        };
        let error = match error.downcast::<QueryRejection>() {
            Ok(rejection) => return Self::from(*rejection),
            Err(error) => error,
        };
        let error = match error.downcast::<FormRejection>() {
            Ok(rejection) => return Self::from(*rejection),
            Err(error) => error,
        };
        let error = match error.downcast::<PathRejection>() {
            Ok(rejection) => return Self::from(*rejection),
            Err(error) => error,
        };
        Self::Unhandled(error)
    }
}

impl From<ApiError> for Exception {
    fn from(error: ApiError) -> Self {
        Self::api(error)
    }
}

impl From<anyhow::Error> for Exception {
    fn from(error: anyhow::Error) -> Self {
        Self::Unhandled(error.into())
    }
}

impl From<JsonRejection> for Exception {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self::media_type_not_supported(None, vec![mime_json()])
            }
            other => Self::not_readable(other),
        }
    }
}

impl From<QueryRejection> for Exception {
    fn from(rejection: QueryRejection) -> Self {
        Self::Bind(ValidationFailures::single("query", rejection.body_text()))
    }
}

impl From<FormRejection> for Exception {
    fn from(rejection: FormRejection) -> Self {
        match rejection {
            FormRejection::InvalidFormContentType(_) => {
                Self::media_type_not_supported(None, vec![mime_form()])
            }
            FormRejection::FailedToDeserializeForm(_)
            | FormRejection::FailedToDeserializeFormBody(_) => {
                Self::Bind(ValidationFailures::single("form", rejection.body_text()))
            }
            other => Self::not_readable(other),
        }
    }
}

/// Undecodable path segments are binding failures. A route whose captures
/// don't fit the extractor is a programming error.
impl From<PathRejection> for Exception {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(inner)
                if inner.status().is_client_error() =>
            {
                Self::Bind(ValidationFailures::single("path", inner.body_text()))
            }
            other => Self::unhandled(other),
        }
    }
}

pub(crate) fn mime_json() -> String {
    "application/json".to_string()
}

pub(crate) fn mime_form() -> String {
    "application/x-www-form-urlencoded".to_string()
}

/// Response extension carrying the exception a handler returned
///
/// `ExceptionMiddleware` takes it back out and renders it through the
/// configured filter's `render`. The exception has been logged already.
#[derive(Clone)]
pub(crate) struct RaisedException(pub(crate) Arc<Exception>);

impl IntoResponse for Exception {
    fn into_response(self) -> Response {
        log_exception(&self);
        let mut response = RestExceptionFilter::default()
            .classify(&self)
            .into_response();
        response
            .extensions_mut()
            .insert(RaisedException(Arc::new(self)));
        response
    }
}
