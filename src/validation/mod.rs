//! Validation failures collected while binding or validating request input
//!
//! A [`ValidationFailures`] set keeps failures in the order they were
//! reported. Its [`flatten`](ValidationFailures::flatten) form is what ends up
//! in the error body: every default message joined by a newline.

use std::fmt;

/// A single rule violation, attached to one field or to the whole object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub object_name: String,
    pub field: Option<String>,
    pub code: Option<String>,
    pub default_message: String,
}

impl ValidationFailure {
    /// Failure attached to a named field
    pub fn field(
        object_name: impl Into<String>,
        field: impl Into<String>,
        default_message: impl Into<String>,
    ) -> Self {
        Self {
            object_name: object_name.into(),
            field: Some(field.into()),
            code: None,
            default_message: default_message.into(),
        }
    }

    /// Failure attached to the object as a whole
    pub fn global(object_name: impl Into<String>, default_message: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            field: None,
            code: None,
            default_message: default_message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "Field error in object '{}' on field '{}': {}",
                self.object_name, field, self.default_message
            ),
            None => write!(
                f,
                "Error in object '{}': {}",
                self.object_name, self.default_message
            ),
        }
    }
}

/// Ordered set of validation failures for one target object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailures {
    object_name: String,
    failures: Vec<ValidationFailure>,
}

impl ValidationFailures {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            failures: Vec::new(),
        }
    }

    /// Build a set holding exactly one object-level failure
    pub fn single(object_name: impl Into<String>, default_message: impl Into<String>) -> Self {
        let mut failures = Self::new(object_name);
        failures.reject(None::<String>, default_message);
        failures
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Record an object-level failure
    pub fn reject(&mut self, code: Option<impl Into<String>>, default_message: impl Into<String>) {
        let mut failure = ValidationFailure::global(self.object_name.clone(), default_message);
        failure.code = code.map(Into::into);
        self.failures.push(failure);
    }

    /// Record a failure for `field`
    pub fn reject_value(
        &mut self,
        field: impl Into<String>,
        code: Option<impl Into<String>>,
        default_message: impl Into<String>,
    ) {
        let mut failure =
            ValidationFailure::field(self.object_name.clone(), field, default_message);
        failure.code = code.map(Into::into);
        self.failures.push(failure);
    }

    pub fn push(&mut self, failure: ValidationFailure) {
        self.failures.push(failure);
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every failure, in reported order
    pub fn all_errors(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Failures attached to a specific field
    pub fn field_errors(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(|f| f.field.is_some())
    }

    /// Failures attached to the object as a whole
    pub fn global_errors(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(|f| f.field.is_none())
    }

    /// Join the default messages with `\n`, without a trailing separator
    ///
    /// An empty set yields an empty string.
    pub fn flatten(&self) -> String {
        self.failures
            .iter()
            .map(|f| f.default_message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `Ok(())` if nothing was rejected, otherwise the set itself
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ValidationFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation failed for object '{}'. Error count: {}",
            self.object_name,
            self.failures.len()
        )
    }
}

impl Extend<ValidationFailure> for ValidationFailures {
    fn extend<I: IntoIterator<Item = ValidationFailure>>(&mut self, iter: I) {
        self.failures.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ValidationFailures {
    type Item = &'a ValidationFailure;
    type IntoIter = std::slice::Iter<'a, ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

/// Types that can check their own invariants after deserialization
///
/// # Example
/// ```
/// use simple_exceptions::validation::{Validate, ValidationFailures};
///
/// struct CreateUser {
///     name: String,
///     age: i32,
/// }
///
/// impl Validate for CreateUser {
///     fn validate(&self, failures: &mut ValidationFailures) {
///         if self.name.trim().is_empty() {
///             failures.reject_value("name", Some("NotBlank"), "must not be blank");
///         }
///         if self.age <= 0 {
///             failures.reject_value("age", Some("Positive"), "must be positive");
///         }
///     }
/// }
///
/// let failures = CreateUser { name: "".into(), age: 0 }.validated().unwrap_err();
/// assert_eq!(failures.flatten(), "must not be blank\nmust be positive");
/// ```
pub trait Validate {
    /// Record every violated rule into `failures`
    fn validate(&self, failures: &mut ValidationFailures);

    /// Name used for the target object in failure reports
    fn object_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Run [`validate`](Validate::validate) into a fresh set
    fn validated(&self) -> Result<(), ValidationFailures> {
        let mut failures = ValidationFailures::new(self.object_name());
        self.validate(&mut failures);
        failures.into_result()
    }
}

fn short_type_name(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_keeps_reported_order() {
        let mut failures = ValidationFailures::new("user");
        failures.reject_value("name", Some("NotBlank"), "must not be blank");
        failures.reject_value("age", Some("Positive"), "must be positive");

        assert_eq!(failures.flatten(), "must not be blank\nmust be positive");
    }

    #[test]
    fn test_flatten_empty_set_is_empty_string() {
        let failures = ValidationFailures::new("user");

        assert!(!failures.has_errors());
        assert_eq!(failures.flatten(), "");
    }

    #[test]
    fn test_flatten_single_failure_has_no_separator() {
        let failures = ValidationFailures::single("query", "invalid digit found in string");

        assert_eq!(failures.flatten(), "invalid digit found in string");
    }

    #[test]
    fn test_field_and_global_errors_are_split() {
        let mut failures = ValidationFailures::new("order");
        failures.reject_value("quantity", None::<String>, "must be positive");
        failures.reject(Some("Consistent"), "totals do not match");

        assert_eq!(failures.field_errors().count(), 1);
        assert_eq!(failures.global_errors().count(), 1);
        assert_eq!(
            failures.global_errors().next().unwrap().code.as_deref(),
            Some("Consistent")
        );
    }

    struct Payload {
        email: String,
    }

    impl Validate for Payload {
        fn validate(&self, failures: &mut ValidationFailures) {
            if !self.email.contains('@') {
                failures.reject_value("email", Some("Email"), "must be a well-formed email address");
            }
        }
    }

    #[test]
    fn test_validated_uses_short_type_name() {
        let failures = Payload {
            email: "nope".into(),
        }
        .validated()
        .unwrap_err();

        assert_eq!(failures.object_name(), "Payload");
        assert_eq!(
            failures.all_errors()[0].to_string(),
            "Field error in object 'Payload' on field 'email': must be a well-formed email address"
        );
    }

    #[test]
    fn test_validated_ok_when_nothing_rejected() {
        let payload = Payload {
            email: "a@b.c".into(),
        };

        assert!(payload.validated().is_ok());
    }
}
