use crate::error::{Result, SimpleExceptionsError};
use axum::http::StatusCode;
use thiserror::Error;

/// An error raised deliberately by application code
///
/// The status code and message are trusted and sent to the caller verbatim.
/// Implement it by hand, or derive it:
///
/// ```
/// use simple_exceptions::ApiException;
///
/// #[derive(Debug, thiserror::Error, ApiException)]
/// pub enum UserError {
///     #[error("User {0} not found")]
///     #[api_exception(status = 404)]
///     NotFound(String),
///
///     #[error("Email is already taken")]
///     #[api_exception(status = 409)]
///     EmailTaken,
/// }
/// ```
pub trait ApiException: std::error::Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode;

    /// Message sent to the caller
    fn message(&self) -> String {
        self.to_string()
    }
}

/// Ready-made [`ApiException`] carrying an explicit status and message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Create an error from a raw status code
    ///
    /// Codes outside `100..=599` are rejected.
    pub fn new(code: u16, message: impl Into<String>) -> Result<Self> {
        if !(100..=599).contains(&code) {
            return Err(SimpleExceptionsError::InvalidStatusCode { code });
        }
        let status = StatusCode::from_u16(code)
            .map_err(|_| SimpleExceptionsError::InvalidStatusCode { code })?;
        Ok(Self::from_status(status, message))
    }

    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_status(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_status(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::from_status(StatusCode::CONFLICT, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ApiException for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}
