use crate::common::ErrorBody;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use strum_macros::{AsRefStr, Display, EnumIter};

/// Category a raised error was classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Api,
    NotReadable,
    Bind,
    MethodArgumentNotValid,
    MethodNotAllowed,
    UnsupportedMediaType,
    Unhandled,
}

impl ErrorKind {
    /// Whether the original error is logged at error severity
    ///
    /// Domain and validation errors are anticipated and stay quiet.
    pub fn is_logged(&self) -> bool {
        !matches!(
            self,
            ErrorKind::Api | ErrorKind::Bind | ErrorKind::MethodArgumentNotValid
        )
    }
}

/// Outcome of classifying one failed request
///
/// Built once per failure and turned into the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub message: String,
    /// Only set for [`ErrorKind::MethodNotAllowed`]
    pub allowed_methods: Option<Vec<Method>>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            allowed_methods: None,
        }
    }

    pub fn with_allowed_methods(mut self, methods: Vec<Method>) -> Self {
        self.allowed_methods = Some(methods);
        self
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody::new(self.message.clone())
    }

    /// Value for the `Allow` header, absent when the allowed set is unknown or empty
    pub fn allow_header(&self) -> Option<HeaderValue> {
        let methods = self.allowed_methods.as_ref().filter(|m| !m.is_empty())?;
        HeaderValue::from_str(&join_methods(methods)).ok()
    }
}

pub(crate) fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for ClassifiedError {
    fn into_response(self) -> Response {
        let allow = self.allow_header();
        let mut response = self.body().with_status(self.status);
        if let Some(allow) = allow {
            response.headers_mut().insert(header::ALLOW, allow);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_anticipated_kinds_skip_error_logging() {
        let quiet: Vec<_> = ErrorKind::iter().filter(|k| !k.is_logged()).collect();

        assert_eq!(
            quiet,
            vec![
                ErrorKind::Api,
                ErrorKind::Bind,
                ErrorKind::MethodArgumentNotValid
            ]
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::MethodArgumentNotValid.to_string(), "method_argument_not_valid");
        assert_eq!(ErrorKind::NotReadable.as_ref(), "not_readable");
    }

    #[test]
    fn test_allow_header_joined_with_comma_space() {
        let classified = ClassifiedError::new(ErrorKind::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED, "x")
            .with_allowed_methods(vec![Method::GET, Method::POST]);

        let response = classified.into_response();
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, POST");
    }

    #[test]
    fn test_allow_header_omitted_for_empty_set() {
        let classified = ClassifiedError::new(ErrorKind::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED, "x")
            .with_allowed_methods(Vec::new());

        assert!(classified.allow_header().is_none());
        assert!(classified.into_response().headers().get(header::ALLOW).is_none());
    }
}
