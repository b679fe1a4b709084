//! Response assertions
//!
//! No I/O. Each check returns the decoded value it vouched for, or the
//! first contract violation it found.

use std::collections::HashSet;

use restcheck_core::expect::not_found_body;
use restcheck_core::{
    FieldError, FieldErrorMismatch, JSON_CONTENT_TYPE, OutcomeStatus, ResponseSnapshot,
    SchemaError, ValidationFailure, compare_field_errors,
};
use serde_json::{Map, Value};

use crate::client::ClientError;

/// Why a scenario did not pass.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Transport(#[from] ClientError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),
    /// Full schema diagnostic
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    FieldErrors(#[from] FieldErrorMismatch),
    #[error("{0}")]
    Contract(String),
}

impl ScenarioError {
    /// Harness problems error the scenario; API misbehaviour fails it.
    #[must_use]
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Transport(_) | Self::Schema(_) | Self::InvalidSchema(_) => OutcomeStatus::Errored,
            Self::Validation(_) | Self::FieldErrors(_) | Self::Contract(_) => OutcomeStatus::Failed,
        }
    }

    pub(crate) fn contract(message: impl Into<String>) -> Self {
        Self::Contract(message.into())
    }
}

impl From<ValidationFailure> for ScenarioError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::InvalidSchema(msg) => Self::InvalidSchema(msg),
            ValidationFailure::Mismatch { diagnostic, .. } => Self::Validation(diagnostic),
        }
    }
}

pub type CheckResult<T = ()> = Result<T, ScenarioError>;

pub fn expect_status(resp: &ResponseSnapshot, expected: u16) -> CheckResult {
    if resp.status == expected {
        Ok(())
    } else {
        Err(ScenarioError::contract(format!(
            "expected status {expected}, got {}: {}",
            resp.status,
            resp.body_preview()
        )))
    }
}

/// `Content-Type` must be exactly the JSON one and the body must parse.
pub fn expect_json(resp: &ResponseSnapshot) -> CheckResult<Value> {
    match resp.content_type() {
        Some(JSON_CONTENT_TYPE) => {}
        Some(other) => {
            return Err(ScenarioError::contract(format!(
                "expected Content-Type {JSON_CONTENT_TYPE:?}, got {other:?}"
            )));
        }
        None => {
            return Err(ScenarioError::contract(format!(
                "expected Content-Type {JSON_CONTENT_TYPE:?}, header missing"
            )));
        }
    }
    serde_json::from_str(&resp.body).map_err(|e| {
        ScenarioError::contract(format!(
            "response body is not valid JSON ({e}): {}",
            resp.body_preview()
        ))
    })
}

/// Status check followed by [`expect_json`].
pub fn expect_json_status(resp: &ResponseSnapshot, status: u16) -> CheckResult<Value> {
    expect_status(resp, status)?;
    expect_json(resp)
}

/// 204 with no `Content-Type` and an empty body.
pub fn expect_no_content(resp: &ResponseSnapshot) -> CheckResult {
    expect_status(resp, 204)?;
    if let Some(ct) = resp.content_type() {
        return Err(ScenarioError::contract(format!(
            "expected no Content-Type on 204, got {ct:?}"
        )));
    }
    if !resp.body.is_empty() {
        return Err(ScenarioError::contract(format!(
            "expected empty body on 204, got {:?}",
            resp.body_preview()
        )));
    }
    Ok(())
}

/// 404 with `{"message": "Resource not found"}`.
pub fn expect_not_found(resp: &ResponseSnapshot) -> CheckResult {
    let body = expect_json_status(resp, 404)?;
    let expected = not_found_body();
    if body == expected {
        Ok(())
    } else {
        Err(ScenarioError::contract(format!(
            "expected not-found body {expected}, got {body}"
        )))
    }
}

/// 422 whose body is a JSON array of `{field, message}` equal to `expected`
/// in any order.
pub fn expect_field_errors(resp: &ResponseSnapshot, expected: Vec<FieldError>) -> CheckResult {
    let body = expect_json_status(resp, 422)?;
    if !body.is_array() {
        return Err(ScenarioError::contract(format!(
            "expected a JSON array of validation errors, got {body}"
        )));
    }
    let actual: Vec<FieldError> = serde_json::from_value(body.clone()).map_err(|e| {
        ScenarioError::contract(format!("malformed validation errors ({e}): {body}"))
    })?;
    compare_field_errors(actual, expected)?;
    Ok(())
}

/// `id` is present and a strictly positive integer.
pub fn expect_positive_id(body: &Value) -> CheckResult<u64> {
    match body.get("id") {
        Some(id) => id
            .as_u64()
            .filter(|n| *n > 0)
            .ok_or_else(|| ScenarioError::contract(format!("expected positive integer id, got {id}"))),
        None => Err(ScenarioError::contract("response has no id")),
    }
}

/// Field `key` of `body` equals `expected` (a missing key counts as `null`).
pub fn expect_field(body: &Value, key: &str, expected: &Value) -> CheckResult {
    let actual = body.get(key).unwrap_or(&Value::Null);
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioError::contract(format!(
            "{key}: expected {expected}, got {actual}"
        )))
    }
}

/// Every submitted field comes back unchanged.
pub fn expect_echo(body: &Value, submitted: &Map<String, Value>) -> CheckResult {
    for (key, value) in submitted {
        expect_field(body, key, value)?;
    }
    Ok(())
}

/// `X-Pagination-Page` / `X-Pagination-Limit` echo the request.
pub fn expect_pagination(resp: &ResponseSnapshot, page: u64, per_page: u64) -> CheckResult {
    for (header, expected) in [("x-pagination-page", page), ("x-pagination-limit", per_page)] {
        let expected = expected.to_string();
        match resp.header(header) {
            Some(v) if v == expected => {}
            other => {
                return Err(ScenarioError::contract(format!(
                    "{header}: expected {expected:?}, got {other:?}"
                )));
            }
        }
    }
    Ok(())
}

/// `body` is an array of exactly `count` items.
pub fn expect_item_count(body: &Value, count: usize) -> CheckResult<&[Value]> {
    let items = body
        .as_array()
        .ok_or_else(|| ScenarioError::contract(format!("expected a JSON array, got {body}")))?;
    if items.len() == count {
        Ok(items)
    } else {
        Err(ScenarioError::contract(format!(
            "expected {count} items, got {}",
            items.len()
        )))
    }
}

/// All `id`s of a listing are pairwise distinct.
pub fn expect_unique_ids(body: &Value) -> CheckResult {
    let items = body
        .as_array()
        .ok_or_else(|| ScenarioError::contract(format!("expected a JSON array, got {body}")))?;
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for item in items {
        let id = item.get("id").unwrap_or(&Value::Null);
        if !seen.insert(id.to_string()) {
            duplicates.push(id.to_string());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ScenarioError::contract(format!(
            "ids are not unique: {}",
            duplicates.join(", ")
        )))
    }
}
