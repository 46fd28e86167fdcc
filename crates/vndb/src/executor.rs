//! Request execution over the pooled HTTP client.
//!
//! [`RequestExecutor`] is the production [`ApiTransport`]: it resolves the
//! request path against the origin, attaches the bearer credential, sends
//! exactly one attempt through the [`Connection`]'s pool, and turns the
//! response into JSON or a classified [`VndbError`].

use std::time::Instant;

use async_trait::async_trait;
use catalog::{ApiRequest, ApiTransport, Credential, HttpMethod, Result, VndbError};
use serde_json::{Map, Value};
use tracing::{debug, warn, Instrument};

use crate::pool::{Connection, HttpPool};

/// Sends API calls through a pooled `reqwest::Client`.
pub struct RequestExecutor {
    base_url: String,
    credential: Option<Credential>,
    connection: Connection,
}

impl RequestExecutor {
    pub(crate) fn new(
        base_url: impl Into<String>,
        credential: Option<Credential>,
        connection: Connection,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credential,
            connection,
        }
    }

    /// Origin every request path is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the pool is created and closed by this executor.
    pub fn owns_connection(&self) -> bool {
        self.connection.is_owned()
    }

    /// The open pool requests currently go through.
    pub async fn pool(&self) -> Result<HttpPool> {
        self.connection.acquire().await
    }

    /// Closes an owned pool. Returns `true` only if this call closed it.
    pub async fn close(&self) -> bool {
        self.connection.close().await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let pool = self.connection.acquire().await?;
        let lease = pool.checkout().await?;

        let url = self.url(&request.path);
        let mut builder = lease.http.request(method(request.method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(credential) = &request.credential {
            builder = builder.bearer_auth(credential.token());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response was received");
            VndbError::transport(describe(&e), e)
        })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| VndbError::transport("failed to read response body", e))?;
        drop(lease);

        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Response received"
        );
        interpret(status, &body)
    }
}

#[async_trait]
impl ApiTransport for RequestExecutor {
    async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let span = tracing::debug_span!(
            "vndb.request",
            method = %request.method,
            path = %request.path,
            authenticated = request.credential.is_some(),
        );
        self.send(request).instrument(span).await
    }

    fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .field("owns_connection", &self.owns_connection())
            .finish()
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn describe(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "could not connect to the API"
    } else {
        "request failed"
    }
}

/// Turns a status and raw body into the call's outcome.
///
/// 2xx bodies are parsed as JSON, with an empty body standing for `{}`.
/// Anything else is classified by status, carrying the remote's message.
pub(crate) fn interpret(status: u16, body: &[u8]) -> Result<Value> {
    if (200..300).contains(&status) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }
        return serde_json::from_slice(body)
            .map_err(|source| VndbError::MalformedResponse { status, source });
    }
    Err(VndbError::from_status(status, error_message(body)))
}

/// The remote's error text: the `error` or `message` key of a JSON body,
/// otherwise the raw body.
fn error_message(body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(Value::String(text)) = map.get(key) {
                return text.clone();
            }
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_owned();
    if text.is_empty() {
        "no error message".to_owned()
    } else {
        text
    }
}
