//! Expected validation-error records and order-independent comparison
//!
//! The API returns 422 bodies as arrays of `{field, message}` in no specified
//! order. Both sides are sorted by field (ties broken by message) before the
//! structural comparison.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Message texts exactly as the remote service emits them, typos included.
pub mod messages {
    pub const BLANK: &str = "can't be blank";
    pub const BLANK_GENDER: &str = "can't be blank, can be male of female";
    pub const BLANK_TODO_STATUS: &str = "can't be blank, can be pending or completed";
    pub const INVALID: &str = "is invalid";
    pub const TAKEN: &str = "has already been taken";
    pub const MUST_EXIST: &str = "must exist";
    pub const RESOURCE_NOT_FOUND: &str = "Resource not found";
}

/// One `{field, message}` entry of a 422 response.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(deny_unknown_fields)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Build an expected list from `(field, message)` pairs.
#[must_use]
pub fn field_errors(pairs: &[(&str, &str)]) -> Vec<FieldError> {
    pairs
        .iter()
        .map(|(field, message)| FieldError::new(*field, *message))
        .collect()
}

/// Sort by field, then by message.
#[must_use]
pub fn sorted_by_field(mut errors: Vec<FieldError>) -> Vec<FieldError> {
    errors.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    errors
}

/// Outcome of a failed comparison, listing both sorted sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorMismatch {
    pub actual: Vec<FieldError>,
    pub expected: Vec<FieldError>,
}

impl FieldErrorMismatch {
    /// Entries expected but absent from the response.
    #[must_use]
    pub fn missing(&self) -> Vec<&FieldError> {
        self.expected
            .iter()
            .filter(|e| !self.actual.contains(e))
            .collect()
    }

    /// Entries in the response that were not expected.
    #[must_use]
    pub fn unexpected(&self) -> Vec<&FieldError> {
        self.actual
            .iter()
            .filter(|e| !self.expected.contains(e))
            .collect()
    }
}

impl std::fmt::Display for FieldErrorMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "validation errors differ")?;
        writeln!(f, "  expected: {}", render(&self.expected))?;
        writeln!(f, "  actual:   {}", render(&self.actual))?;
        for e in self.missing() {
            writeln!(f, "  - missing    {e}")?;
        }
        for e in self.unexpected() {
            writeln!(f, "  + unexpected {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrorMismatch {}

fn render(errors: &[FieldError]) -> String {
    serde_json::to_string(errors).unwrap_or_else(|_| format!("{errors:?}"))
}

/// Compare two error lists ignoring order.
///
/// # Errors
///
/// Returns both sorted lists when they differ.
pub fn compare_field_errors(
    actual: Vec<FieldError>,
    expected: Vec<FieldError>,
) -> Result<(), FieldErrorMismatch> {
    let actual = sorted_by_field(actual);
    let expected = sorted_by_field(expected);
    if actual == expected {
        Ok(())
    } else {
        Err(FieldErrorMismatch { actual, expected })
    }
}

/// Body of a 404 response.
#[must_use]
pub fn not_found_body() -> serde_json::Value {
    serde_json::json!({ "message": messages::RESOURCE_NOT_FOUND })
}
