//! Error taxonomy for every failure surfaced by the VNDB client.
//!
//! [`VndbError`] is the only error type that crosses the public API boundary.
//! Transport, serialisation, and lifecycle failures are all folded into it so
//! callers match on a stable set of [`ErrorKind`]s instead of on library
//! internals.
//!
//! Classification of HTTP outcomes is a pure function of the status code and
//! the error message extracted from the response body; see
//! [`VndbError::from_status`].
//!
//! [`RetryPolicy`] is advisory only: this crate never retries. Callers that
//! want retries compose them outside the client and may consult it.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is reasonable for a caller to retry.
///
/// Returned by [`VndbError::retry_policy`]. The client itself performs
/// exactly one attempt per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryPolicy {
    /// The operation may be retried by the caller.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// Retrying the same request will produce the same failure.
    NonRetryable,
}

impl RetryPolicy {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryPolicy::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// The stable classification of a [`VndbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or rejected credential.
    Authentication,
    /// The remote throttled the caller.
    RateLimit,
    /// Malformed query: bad filter syntax, unknown field, unserialisable body.
    InvalidRequest,
    /// The referenced path or entity does not exist.
    NotFound,
    /// The selection would exceed the remote's response size limits.
    TooMuchDataSelected,
    /// Remote-side failure (5xx) or a transport failure before any response.
    Server,
    /// Any other failure: unexpected status, malformed body, lifecycle.
    Api,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::TooMuchDataSelected => "too_much_data_selected",
            ErrorKind::Server => "server",
            ErrorKind::Api => "api",
        };
        f.write_str(name)
    }
}

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum VndbError {
    /// The credential is missing, invalid, or lacks a required permission.
    ///
    /// `status` is `None` when the failure was detected locally, before any
    /// network call was made.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// HTTP status code, if the remote produced this failure.
        status: Option<u16>,
        /// Human-readable cause.
        message: String,
    },

    /// The remote throttled the request (HTTP 429).
    #[error("Rate limited (status {status}): {message}")]
    RateLimit {
        /// HTTP status code.
        status: u16,
        /// Message from the remote.
        message: String,
    },

    /// The request was rejected as malformed.
    ///
    /// `status` is `None` when the request body could not be serialised.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// HTTP status code, if the remote produced this failure.
        status: Option<u16>,
        /// Human-readable cause.
        message: String,
    },

    /// The API path or referenced entity does not exist (HTTP 404).
    #[error("Not found (status {status}): {message}")]
    NotFound {
        /// HTTP status code.
        status: u16,
        /// Message from the remote.
        message: String,
    },

    /// The field selection or page size would produce too large a response.
    #[error("Too much data selected (status {status}): {message}")]
    TooMuchDataSelected {
        /// HTTP status code.
        status: u16,
        /// Message from the remote.
        message: String,
    },

    /// The remote failed while handling the request (HTTP 5xx).
    #[error("Server error (status {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the remote.
        message: String,
    },

    /// No response was received: connection refused, timeout, DNS failure.
    ///
    /// Classified as [`ErrorKind::Server`] but distinguishable from an HTTP
    /// 5xx through [`VndbError::is_transport`].
    #[error("Transport failure: {message}")]
    Transport {
        /// Short description of the failed step.
        message: String,
        /// The underlying transport error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A 2xx response whose body is not valid JSON.
    #[error("Malformed response body (status {status}): {source}")]
    MalformedResponse {
        /// HTTP status code of the response.
        status: u16,
        /// The JSON parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A 2xx JSON body that does not have the expected shape, e.g. a query
    /// response that is not an object or whose `results` is not an array.
    #[error("Unexpected response shape: {message}")]
    UnexpectedResponse {
        /// What was wrong with the body.
        message: String,
    },

    /// The connection pool could not be created or has been closed.
    #[error("Connection lifecycle error: {message}")]
    Lifecycle {
        /// Human-readable cause.
        message: String,
    },

    /// Any other non-2xx response.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the remote.
        message: String,
    },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, VndbError>;

impl VndbError {
    /// Classifies a non-2xx HTTP outcome.
    ///
    /// | Status | Kind |
    /// |--------|------|
    /// | 401, 403 | [`ErrorKind::Authentication`] |
    /// | 429 | [`ErrorKind::RateLimit`] |
    /// | 400 | [`ErrorKind::InvalidRequest`], or [`ErrorKind::TooMuchDataSelected`] when the message says so |
    /// | 404 | [`ErrorKind::NotFound`] |
    /// | 413 | [`ErrorKind::TooMuchDataSelected`] |
    /// | 500–599 | [`ErrorKind::Server`] |
    /// | anything else | [`ErrorKind::Api`] |
    ///
    /// Two rules narrow the plain status grid: a 400 whose message contains
    /// "too much data" and any 413 both map to
    /// [`ErrorKind::TooMuchDataSelected`], not to `InvalidRequest` or `Api`.
    /// Callers treating every 400 as `InvalidRequest` must match both kinds.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => VndbError::Authentication {
                status: Some(status),
                message,
            },
            429 => VndbError::RateLimit { status, message },
            400 if mentions_too_much_data(&message) => {
                VndbError::TooMuchDataSelected { status, message }
            }
            400 => VndbError::InvalidRequest {
                status: Some(status),
                message,
            },
            404 => VndbError::NotFound { status, message },
            413 => VndbError::TooMuchDataSelected { status, message },
            500..=599 => VndbError::Server { status, message },
            _ => VndbError::Api { status, message },
        }
    }

    /// Local pre-flight failure for an operation that needs a credential.
    pub fn missing_credential(operation: &str) -> Self {
        VndbError::Authentication {
            status: None,
            message: format!("an API token is required for {operation}"),
        }
    }

    /// Wraps a transport-level failure.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        VndbError::Transport {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Local failure to build a request body.
    pub fn unserialisable(source: serde_json::Error) -> Self {
        VndbError::InvalidRequest {
            status: None,
            message: format!("request body could not be serialised: {source}"),
        }
    }

    /// Creates an unexpected-shape error for a successfully parsed body.
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        VndbError::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Creates a connection lifecycle error.
    pub fn lifecycle(message: impl Into<String>) -> Self {
        VndbError::Lifecycle {
            message: message.into(),
        }
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VndbError::Authentication { .. } => ErrorKind::Authentication,
            VndbError::RateLimit { .. } => ErrorKind::RateLimit,
            VndbError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            VndbError::NotFound { .. } => ErrorKind::NotFound,
            VndbError::TooMuchDataSelected { .. } => ErrorKind::TooMuchDataSelected,
            VndbError::Server { .. } | VndbError::Transport { .. } => ErrorKind::Server,
            VndbError::MalformedResponse { .. }
            | VndbError::UnexpectedResponse { .. }
            | VndbError::Lifecycle { .. }
            | VndbError::Api { .. } => ErrorKind::Api,
        }
    }

    /// HTTP status code of the response that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            VndbError::Authentication { status, .. } | VndbError::InvalidRequest { status, .. } => {
                *status
            }
            VndbError::RateLimit { status, .. }
            | VndbError::NotFound { status, .. }
            | VndbError::TooMuchDataSelected { status, .. }
            | VndbError::Server { status, .. }
            | VndbError::MalformedResponse { status, .. }
            | VndbError::Api { status, .. } => Some(*status),
            VndbError::Transport { .. }
            | VndbError::UnexpectedResponse { .. }
            | VndbError::Lifecycle { .. } => None,
        }
    }

    /// Returns `true` if no HTTP response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, VndbError::Transport { .. })
    }

    /// Advisory retry classification for callers that compose their own retries.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self.kind() {
            ErrorKind::RateLimit | ErrorKind::Server => RetryPolicy::Retryable { after: None },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

fn mentions_too_much_data(message: &str) -> bool {
    message.to_ascii_lowercase().contains("too much data")
}
