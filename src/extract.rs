//! Extractors whose rejections are [`Exception`]s
//!
//! Drop-in replacements for axum's `Json`, `Query`, `Form` and `Path`. Failures are
//! reported through the exception filter instead of axum's plain-text
//! rejections, and [`Valid`] runs [`Validate`] on the extracted value.
//!
//! ```rust,no_run
//! use simple_exceptions::extract::{Json, Valid};
//! use simple_exceptions::validation::{Validate, ValidationFailures};
//! use serde::Deserialize;
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
//! async fn create_user(Valid(Json(user)): Valid<Json<CreateUser>>) -> String {
//!     user.name
//! }
//! ```

use crate::exception::{Exception, mime_form, mime_json};
use crate::validation::{Validate, ValidationFailures};
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use std::ops::{Deref, DerefMut};

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

macro_rules! wrapper {
    ($name:ident) => {
        impl<T> Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &T {
                &self.0
            }
        }

        impl<T> DerefMut for $name<T> {
            fn deref_mut(&mut self) -> &mut T {
                &mut self.0
            }
        }
    };
}

/// JSON request body
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

wrapper!(Json);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(req.headers());
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => Err(
                Exception::media_type_not_supported(content_type, vec![mime_json()]),
            ),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

/// URL-encoded form body, or query string for `GET`/`HEAD`
#[derive(Debug, Clone, Copy, Default)]
pub struct Form<T>(pub T);

wrapper!(Form);

impl<T, S> FromRequest<S> for Form<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(req.headers());
        match axum::Form::<T>::from_request(req, state).await {
            Ok(axum::Form(value)) => Ok(Form(value)),
            Err(FormRejection::InvalidFormContentType(_)) => Err(
                Exception::media_type_not_supported(content_type, vec![mime_form()]),
            ),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

/// Query string parameters
///
/// Decoding failures are binding failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

wrapper!(Query);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Query(value))
    }
}

/// Captured path parameters
///
/// A segment that doesn't decode into `T` is a binding failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

wrapper!(Path);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Path(value))
    }
}

/// Runs [`Validate`] on the wrapped extractor's value
///
/// A JSON body that fails validation is a `MethodArgumentNotValid` exception;
/// query and form parameters that fail are binding failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<E>(pub E);

wrapper!(Valid);

fn check<T: Validate>(value: &T) -> Result<(), ValidationFailures> {
    value.validated()
}

impl<T, S> FromRequest<S> for Valid<Json<T>>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = Json::<T>::from_request(req, state).await?;
        check(&json.0).map_err(Exception::MethodArgumentNotValid)?;
        Ok(Valid(json))
    }
}

impl<T, S> FromRequest<S> for Valid<Form<T>>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let form = Form::<T>::from_request(req, state).await?;
        check(&form.0).map_err(Exception::Bind)?;
        Ok(Valid(form))
    }
}

impl<T, S> FromRequestParts<S> for Valid<Query<T>>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Exception;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<T>::from_request_parts(parts, state).await?;
        check(&query.0).map_err(Exception::Bind)?;
        Ok(Valid(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::ErrorKind;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Signup {
        name: String,
        age: i32,
    }

    impl Validate for Signup {
        fn validate(&self, failures: &mut ValidationFailures) {
            if self.name.trim().is_empty() {
                failures.reject_value("name", Some("NotBlank"), "must not be blank");
            }
            if self.age <= 0 {
                failures.reject_value("age", Some("Positive"), "must be positive");
            }
        }
    }

    fn json_request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_json_extracts_value() {
        let req = json_request(Some("application/json"), r#"{"name":"ann","age":3}"#);

        let Json(signup) = Json::<Signup>::from_request(req, &()).await.unwrap();
        assert_eq!(signup.name, "ann");
        assert_eq!(signup.age, 3);
    }

    #[tokio::test]
    async fn test_json_syntax_error_is_not_readable() {
        let req = json_request(Some("application/json"), r#"{"name":"#);

        let err = Json::<Signup>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReadable);
    }

    #[tokio::test]
    async fn test_json_shape_error_is_not_readable() {
        let req = json_request(Some("application/json"), r#"{"name":"ann"}"#);

        let err = Json::<Signup>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReadable);
    }

    #[tokio::test]
    async fn test_json_wrong_content_type_keeps_request_type() {
        let req = json_request(Some("text/plain"), r#"{"name":"ann","age":3}"#);

        let err = Json::<Signup>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);
        assert_eq!(err.to_string(), "Content type 'text/plain' not supported");
    }

    #[tokio::test]
    async fn test_valid_json_reports_all_failures_in_order() {
        let req = json_request(Some("application/json"), r#"{"name":" ","age":0}"#);

        let err = Valid::<Json<Signup>>::from_request(req, &()).await.unwrap_err();
        match err {
            Exception::MethodArgumentNotValid(failures) => {
                assert_eq!(failures.flatten(), "must not be blank\nmust be positive");
            }
            other => panic!("unexpected exception: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_query_failures_are_bind_failures() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/?name=ann&age=-1")
            .body(())
            .unwrap()
            .into_parts();

        let err = Valid::<Query<Signup>>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        match err {
            Exception::Bind(failures) => assert_eq!(failures.flatten(), "must be positive"),
            other => panic!("unexpected exception: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_decode_failure_is_bind_failure() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/?name=ann&age=old")
            .body(())
            .unwrap()
            .into_parts();

        let err = Query::<Signup>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bind);
    }

    #[tokio::test]
    async fn test_valid_form_failures_are_bind_failures() {
        let req = json_request(Some("application/x-www-form-urlencoded"), "name=&age=0");

        let err = Valid::<Form<Signup>>::from_request(req, &()).await.unwrap_err();
        match err {
            Exception::Bind(failures) => {
                assert_eq!(failures.flatten(), "must not be blank\nmust be positive");
            }
            other => panic!("unexpected exception: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_form_passes_valid_value() {
        let req = json_request(Some("application/x-www-form-urlencoded"), "name=ann&age=3");

        let Valid(Form(signup)) = Valid::<Form<Signup>>::from_request(req, &()).await.unwrap();
        assert_eq!(signup.name, "ann");
    }

    #[tokio::test]
    async fn test_path_outside_router_is_unhandled() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/users/7")
            .body(())
            .unwrap()
            .into_parts();

        let err = Path::<u64>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unhandled);
    }

    #[tokio::test]
    async fn test_form_wrong_content_type() {
        let req = json_request(Some("application/json"), r#"{"name":"ann","age":3}"#);

        let err = Form::<Signup>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.to_string(), "Content type 'application/json' not supported");
    }
}
