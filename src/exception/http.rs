use crate::config::{ConfigService, ExceptionMessages};
use crate::error::Result;
use crate::exception::classified::join_methods;
use crate::exception::{
    ApiException, ClassifiedError, ErrorKind, Exception, ExceptionFilter, media_type_description,
};
use crate::validation::ValidationFailures;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

/// The default exception filter
///
/// Maps every [`Exception`] to a status code and a `{ "message": ... }` body.
/// Details of unreadable bodies and uncaught errors are logged and replaced by
/// the configured [`ExceptionMessages`].
#[derive(Debug, Clone, Default)]
pub struct RestExceptionFilter {
    messages: ExceptionMessages,
}

impl RestExceptionFilter {
    pub fn new(messages: ExceptionMessages) -> Self {
        Self { messages }
    }

    pub fn from_config(config: &ConfigService) -> Result<Self> {
        Ok(Self::new(ExceptionMessages::from_config(config)?))
    }

    pub fn messages(&self) -> &ExceptionMessages {
        &self.messages
    }

    /// Pick the handler for the exception's category
    ///
    /// Pure: calling it twice with the same exception yields equal results.
    pub fn classify(&self, exception: &Exception) -> ClassifiedError {
        match exception {
            Exception::Api(api) => self.handle_api_exception(api.as_ref()),
            Exception::NotReadable(_) => self.handle_not_readable(),
            Exception::Bind(failures) => self.handle_bind(failures),
            Exception::MethodArgumentNotValid(failures) => {
                self.handle_method_argument_not_valid(failures)
            }
            Exception::MethodNotSupported { method, supported } => {
                self.handle_method_not_supported(method, supported.as_deref())
            }
            Exception::MediaTypeNotSupported { content_type, .. } => {
                self.handle_media_type_not_supported(content_type.as_deref())
            }
            Exception::Unhandled(_) => self.handle_all(),
        }
    }

    pub fn handle_api_exception(&self, exception: &dyn ApiException) -> ClassifiedError {
        let status = exception.status_code();
        let status = if (100..=599).contains(&status.as_u16()) {
            status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let message = exception.message();
        let message = if message.is_empty() {
            self.messages.global_handler.clone()
        } else {
            message
        };

        ClassifiedError::new(ErrorKind::Api, status, message)
    }

    pub fn handle_not_readable(&self) -> ClassifiedError {
        ClassifiedError::new(
            ErrorKind::NotReadable,
            StatusCode::BAD_REQUEST,
            self.messages.not_readable.clone(),
        )
    }

    pub fn handle_bind(&self, failures: &ValidationFailures) -> ClassifiedError {
        ClassifiedError::new(ErrorKind::Bind, StatusCode::BAD_REQUEST, failures.flatten())
    }

    pub fn handle_method_argument_not_valid(&self, failures: &ValidationFailures) -> ClassifiedError {
        ClassifiedError::new(
            ErrorKind::MethodArgumentNotValid,
            StatusCode::BAD_REQUEST,
            failures.flatten(),
        )
    }

    pub fn handle_method_not_supported(
        &self,
        method: &Method,
        supported: Option<&[Method]>,
    ) -> ClassifiedError {
        let allowed = supported.map(join_methods).unwrap_or_default();
        let message = format!("Method {method} not allowed. Allowed methods: {allowed}.");

        let classified = ClassifiedError::new(
            ErrorKind::MethodNotAllowed,
            StatusCode::METHOD_NOT_ALLOWED,
            message,
        );
        match supported {
            Some(methods) => classified.with_allowed_methods(methods.to_vec()),
            None => classified,
        }
    }

    pub fn handle_media_type_not_supported(&self, content_type: Option<&str>) -> ClassifiedError {
        ClassifiedError::new(
            ErrorKind::UnsupportedMediaType,
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            media_type_description(content_type),
        )
    }

    pub fn handle_all(&self) -> ClassifiedError {
        ClassifiedError::new(
            ErrorKind::Unhandled,
            StatusCode::INTERNAL_SERVER_ERROR,
            self.messages.global_handler.clone(),
        )
    }
}

/// Log an exception the way its category requires
///
/// Anticipated categories stay at debug level. Everything else is logged at
/// error level, masked categories with the full detail the caller never sees.
pub(crate) fn log_exception(exception: &Exception) {
    let kind = exception.kind();
    if !kind.is_logged() {
        tracing::debug!("{} exception: {}", kind, exception);
        return;
    }

    match exception {
        Exception::NotReadable(error) => {
            tracing::error!("Can't read input message: {:?}", error);
        }
        Exception::Unhandled(error) => {
            tracing::error!("Unhandled exception in application! {:?}", error);
        }
        Exception::MediaTypeNotSupported { supported, .. } => {
            tracing::error!("{} (supported: {})", exception, supported.join(", "));
        }
        other => tracing::error!("{}", other),
    }
}

impl ExceptionFilter for RestExceptionFilter {
    fn catch(&self, exception: &Exception) -> Response {
        log_exception(exception);
        self.render(exception)
    }

    fn render(&self, exception: &Exception) -> Response {
        self.classify(exception).into_response()
    }
}
