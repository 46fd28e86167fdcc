//! The transport port implemented by the HTTP layer.
//!
//! Query and mutation clients in this crate describe each call as an
//! [`ApiRequest`] and hand it to an [`ApiTransport`]. The `vndb` crate supplies
//! the production implementation over a pooled HTTP client; tests supply
//! in-memory fakes.
//!
//! ## Contract
//!
//! An implementation performs exactly one attempt per call. It returns the
//! parsed JSON body of a 2xx response (an empty body becomes an empty object)
//! and maps every other outcome onto [`VndbError`].

use async_trait::async_trait;
use serde_json::Value;

use crate::{Credential, Result, VndbError};

/// HTTP method of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    /// The method name as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call against the API, relative to the configured origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path below the origin, starting with `/` (e.g. `"/vn"`).
    pub path: String,
    /// Bearer credential to attach, if any.
    pub credential: Option<Credential>,
    /// JSON body, sent for POST and PATCH.
    pub body: Option<Value>,
    /// Query string parameters, in order. Keys may repeat.
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a request with no body, query, or credential.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            credential: None,
            body: None,
            query: Vec::new(),
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// `POST path` with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// `PATCH path` with a JSON body.
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Patch, path).with_body(body)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attaches the credential, if there is one.
    #[must_use]
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a query string parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Executes [`ApiRequest`]s against the remote.
///
/// Implementations must be shareable across concurrent calls; the production
/// transport shares one connection pool between them.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Performs one call and returns the parsed JSON body.
    async fn execute(&self, request: ApiRequest) -> Result<Value>;

    /// The credential configured for this transport, if any.
    fn credential(&self) -> Option<&Credential>;

    /// Returns the credential or fails locally with an authentication error.
    ///
    /// Used as the pre-flight check for credential-gated operations so that
    /// no network call is made without one.
    fn require_credential(&self, operation: &str) -> Result<Credential> {
        self.credential()
            .cloned()
            .ok_or_else(|| VndbError::missing_credential(operation))
    }
}
