use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Wire format of every error response
///
/// Serializes to a single-field object so clients can rely on one shape
/// regardless of which failure produced it.
///
/// # Example
/// ```
/// use simple_exceptions::common::ErrorBody;
///
/// let body = ErrorBody::new("Can't read request message");
/// assert_eq!(
///     serde_json::to_string(&body).unwrap(),
///     r#"{"message":"Can't read request message"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Pair the body with a status code to build a response
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
