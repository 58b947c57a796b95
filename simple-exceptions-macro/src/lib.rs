use proc_macro::TokenStream;

mod api_exception;

/// Derive macro for errors that carry their own HTTP status
///
/// Implements `ApiException` using the type's `Display` output as the message,
/// and `From<T> for Exception` so the error can be raised with `?`.
///
/// The status is given with `#[api_exception(status = N)]` on a struct, on an
/// enum (as a default), or on individual variants.
///
/// # Example
/// ```ignore
/// use simple_exceptions::ApiException;
///
/// #[derive(Debug, thiserror::Error, ApiException)]
/// #[api_exception(status = 400)]
/// pub enum OrderError {
///     #[error("Quantity must be positive")]
///     InvalidQuantity,
///
///     #[error("Order {0} not found")]
///     #[api_exception(status = 404)]
///     NotFound(u64),
/// }
/// ```
#[proc_macro_derive(ApiException, attributes(api_exception))]
pub fn derive_api_exception(input: TokenStream) -> TokenStream {
    api_exception::derive_api_exception(input)
}
