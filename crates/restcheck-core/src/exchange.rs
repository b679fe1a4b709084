//! Request/response snapshots exchanged between the HTTP client and checks
//!
//! The runner fills these from live responses; everything downstream
//! (assertions, dumps, reports) works on these plain values without I/O.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The only `Content-Type` the API is expected to answer JSON with.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Snapshot of an outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSnapshot {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Snapshot of a received HTTP response.
///
/// Header names are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub latency_ms: u64,
}

impl ResponseSnapshot {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: String::new(),
            latency_ms: 0,
        }
    }

    /// A JSON response with the API's usual content type.
    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header("Content-Type", JSON_CONTENT_TYPE)
            .with_body(body.to_string())
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// First 200 characters of the body, for failure messages.
    #[must_use]
    pub fn body_preview(&self) -> &str {
        match self.body.char_indices().nth(200) {
            Some((end, _)) => &self.body[..end],
            None => &self.body,
        }
    }
}

/// A single request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// Operation label, e.g. "POST /users/{id}/posts"
    pub operation: String,
    pub request: RequestSnapshot,
    pub response: ResponseSnapshot,
}

/// Turn a concrete path into an operation label by replacing numeric
/// segments with `{id}`: `/users/42/posts` → `/users/{id}/posts`.
#[must_use]
pub fn operation_label(method: &str, path: &str) -> String {
    let template: Vec<&str> = path
        .split('/')
        .map(|segment| {
            let digits = segment.strip_prefix('-').unwrap_or(segment);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect();
    format!("{method} {}", template.join("/"))
}
