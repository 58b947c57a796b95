//! # simple-exceptions
//!
//! Uniform JSON error responses for axum applications.
//!
//! Every failure that aborts a request, whether a domain error raised by a
//! handler, a body that can't be parsed, failed validation, an unsupported
//! method or media type, or an unexpected error, is translated into a status
//! code and a body of the form `{"message": "..."}`. Internal details of
//! unexpected errors are logged and never sent to the caller.
//!
//! ## Features
//!
//! - **Exception taxonomy**: [`Exception`] covers every recognized failure
//! - **Domain errors**: derive [`ApiException`] to give an error its own status
//! - **Extractors**: `Json`, `Form`, `Query` and `Path` whose rejections are exceptions
//! - **Validation**: [`Valid`](extract::Valid) extractors with ordered failure messages
//! - **Configurable masking**: default messages via [`ExceptionMessages`]
//! - **Tower integration**: [`ExceptionLayer`] wraps a `Router` or any service
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::{get, post}};
//! use serde::Deserialize;
//! use simple_exceptions::prelude::*;
//! use tower::Layer;
//!
//! #[derive(Debug, thiserror::Error, ApiException)]
//! pub enum UserError {
//!     #[error("User {0} not found")]
//!     #[api_exception(status = 404)]
//!     NotFound(u64),
//! }
//!
//! #[derive(Deserialize)]
//! struct CreateUser {
//!     name: String,
//! }
//!
//! impl Validate for CreateUser {
//!     fn validate(&self, failures: &mut ValidationFailures) {
//!         if self.name.trim().is_empty() {
//!             failures.reject_value("name", Some("NotBlank"), "must not be blank");
//!         }
//!     }
//! }
//!
//! async fn get_user(Path(id): Path<u64>) -> Result<String, Exception> {
//!     Err(UserError::NotFound(id))?
//! }
//!
//! async fn create_user(Valid(Json(user)): Valid<Json<CreateUser>>) -> String {
//!     user.name
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let exceptions = ExceptionLayer::from_config(&ConfigService::new()).unwrap();
//!
//!     let router = Router::new()
//!         .route("/users/{id}", get(get_user))
//!         .route("/users", post(create_user))
//!         .layer(exceptions.catch_panic_layer());
//!     let app = exceptions.layer(router);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, axum::ServiceExt::<axum::extract::Request>::into_make_service(app))
//!         .await
//!         .unwrap();
//! }
//! ```

extern crate self as simple_exceptions;

pub mod common;
pub mod config;
pub mod error;
pub mod exception;
pub mod extract;
pub mod interceptor;
pub mod validation;

// Re-export core types
pub use common::ErrorBody;
pub use config::{ConfigService, ExceptionMessages};
pub use error::{Result, SimpleExceptionsError};
pub use exception::{
    ApiError, ApiException, ClassifiedError, ErrorKind, Exception, ExceptionFilter,
    ExceptionLayer, RestExceptionFilter,
};
pub use validation::{Validate, ValidationFailure, ValidationFailures};

// Re-export macros
pub use simple_exceptions_macro::ApiException;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use simple_exceptions::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::ErrorBody;
    pub use crate::config::{ConfigService, ExceptionMessages};
    pub use crate::error::{Result, SimpleExceptionsError};
    pub use crate::exception::{
        ApiError, ClassifiedError, ErrorKind, Exception, ExceptionFilter, ExceptionLayer,
        RestExceptionFilter,
    };
    pub use crate::extract::{Form, Json, Path, Query, Valid};
    pub use crate::interceptor::{Interceptor, InterceptorLayer, InterceptorResult, Next};
    pub use crate::validation::{Validate, ValidationFailure, ValidationFailures};
    // Both the trait and its derive macro
    pub use crate::ApiException;
    pub use async_trait::async_trait;
    pub use axum::{
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
