//! HTTP access to the API under test
//!
//! Scenarios talk to a [`Transport`]; [`RestClient`] is the reqwest-backed
//! implementation. One blocking client is built per run and reused for every
//! request. Write methods carry `Authorization: Bearer <token>`, reads do not.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

use restcheck_core::exchange::operation_label;
use restcheck_core::{ApiToken, Exchange, RequestSnapshot, ResponseSnapshot};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether the request must carry the bearer token.
    #[must_use]
    pub const fn is_write(self) -> bool {
        !matches!(self, Self::Get)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, e.g. "/users/42"
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of query parameter `name`, if present.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Something that can answer API requests.
pub trait Transport {
    /// Base URL the paths are resolved against.
    fn base_url(&self) -> &str;

    /// Send one request and snapshot the response.
    ///
    /// # Errors
    ///
    /// Returns error if the request could not be sent or the body not read.
    fn execute(&self, request: ApiRequest) -> Result<ResponseSnapshot, ClientError>;

    fn get(&self, path: &str) -> Result<ResponseSnapshot, ClientError> {
        self.execute(ApiRequest::new(Method::Get, path))
    }

    fn get_page(
        &self,
        path: &str,
        page: u64,
        per_page: u64,
    ) -> Result<ResponseSnapshot, ClientError> {
        self.execute(
            ApiRequest::new(Method::Get, path)
                .with_query("page", page)
                .with_query("per_page", per_page),
        )
    }

    fn post(&self, path: &str, body: Value) -> Result<ResponseSnapshot, ClientError> {
        self.execute(ApiRequest::new(Method::Post, path).with_body(body))
    }

    fn put(&self, path: &str, body: Value) -> Result<ResponseSnapshot, ClientError> {
        self.execute(ApiRequest::new(Method::Put, path).with_body(body))
    }

    fn delete(&self, path: &str) -> Result<ResponseSnapshot, ClientError> {
        self.execute(ApiRequest::new(Method::Delete, path))
    }
}

/// reqwest-backed [`Transport`].
pub struct RestClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: ApiToken,
    /// Every exchange, when recording is enabled
    recorded: Option<Mutex<Vec<Exchange>>>,
}

impl RestClient {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, token: ApiToken) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("restcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            recorded: None,
        })
    }

    /// Keep a copy of every request/response pair for [`Self::take_exchanges`].
    #[must_use]
    pub fn with_recording(mut self, enabled: bool) -> Self {
        self.recorded = enabled.then(|| Mutex::new(Vec::new()));
        self
    }

    /// Drain the recorded exchanges (empty when recording is off).
    pub fn take_exchanges(&self) -> Vec<Exchange> {
        match &self.recorded {
            Some(log) => std::mem::take(&mut *log.lock().unwrap_or_else(|e| e.into_inner())),
            None => Vec::new(),
        }
    }

    fn record(&self, exchange: Exchange) {
        if let Some(log) = &self.recorded {
            log.lock().unwrap_or_else(|e| e.into_inner()).push(exchange);
        }
    }
}

impl Transport for RestClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn execute(&self, request: ApiRequest) -> Result<ResponseSnapshot, ClientError> {
        let method = request.method;
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.http.request(method.to_reqwest(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        let mut sent_headers = BTreeMap::new();
        if method.is_write() {
            builder = builder.bearer_auth(self.token.expose());
            sent_headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", self.token.expose()),
            );
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
            sent_headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        let built = builder.build().map_err(|e| ClientError::Send {
            method,
            url: url.clone(),
            message: e.to_string(),
        })?;
        let full_url = built.url().to_string();

        let start = Instant::now();
        let resp = self.http.execute(built).map_err(|e| ClientError::Send {
            method,
            url: full_url.clone(),
            message: e.to_string(),
        })?;

        let mut snapshot = ResponseSnapshot::new(resp.status().as_u16());
        for (name, value) in resp.headers() {
            if let Ok(value) = value.to_str() {
                snapshot = snapshot.with_header(name.as_str(), value);
            }
        }
        let body = resp.text().map_err(|e| ClientError::Body {
            method,
            url: full_url.clone(),
            message: e.to_string(),
        })?;
        snapshot.body = body;
        snapshot.latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(
            method = %method,
            url = %full_url,
            status = snapshot.status,
            latency_ms = snapshot.latency_ms,
            "response"
        );

        if self.recorded.is_some() {
            self.record(Exchange {
                operation: operation_label(method.as_str(), &request.path),
                request: RequestSnapshot {
                    method: method.as_str().to_string(),
                    url: full_url,
                    headers: sent_headers,
                    body: request.body,
                },
                response: snapshot.clone(),
            });
        }

        Ok(snapshot)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Cannot build HTTP client: {0}")]
    Build(String),
    #[error("{method} {url}: {message}")]
    Send {
        method: Method,
        url: String,
        message: String,
    },
    #[error("{method} {url}: cannot read response body: {message}")]
    Body {
        method: Method,
        url: String,
        message: String,
    },
}
