//! Client configuration: API origin, credential, and connection pool limits.
//!
//! Configuration is plain data. It can be built in code, deserialised from
//! any serde format, or read from the environment with
//! [`ClientConfig::from_env`]:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `VNDB_API_TOKEN` | API token; blank means unauthenticated |
//! | `VNDB_SANDBOX` | `1`/`true`/`yes` selects the sandbox origin |
//! | `VNDB_ORIGIN` | Custom origin URL; overrides `VNDB_SANDBOX` |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Production API origin.
pub const PRODUCTION_ORIGIN: &str = "https://api.vndb.org/kana";

/// Sandbox API origin.
pub const SANDBOX_ORIGIN: &str = "https://beta.vndb.org/api/kana";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "VNDB_API_TOKEN";

/// Environment variable selecting the sandbox origin.
pub const SANDBOX_ENV: &str = "VNDB_SANDBOX";

/// Environment variable holding a custom origin.
pub const ORIGIN_ENV: &str = "VNDB_ORIGIN";

/// Errors detected while loading or validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A custom origin is not an absolute HTTP(S) URL.
    #[error("Invalid origin: URL must start with http:// or https://, got: {0}")]
    InvalidOrigin(String),

    /// An environment variable holds a value that cannot be interpreted.
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// A pool limit is zero.
    #[error("Invalid pool configuration: {0}")]
    InvalidPool(&'static str),
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// Which API deployment the client talks to. Fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    #[default]
    Production,
    Sandbox,
    /// Any other deployment, e.g. a local test server.
    Custom(String),
}

impl Origin {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        match self {
            Origin::Production => PRODUCTION_ORIGIN,
            Origin::Sandbox => SANDBOX_ORIGIN,
            Origin::Custom(url) => url.trim_end_matches('/'),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Origin::Custom(url) = self {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidOrigin(url.clone()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Limits of the connection pool the client creates for itself.
///
/// Durations are written in milliseconds when (de)serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Bound on establishing one connection.
    #[serde(with = "millis")]
    pub connect_timeout: Duration,
    /// Bound on one whole request, from send to the last body byte.
    #[serde(with = "millis")]
    pub request_timeout: Duration,
    /// Concurrent requests (and idle connections kept) per host.
    pub max_connections_per_host: usize,
    /// How long `close` waits for in-flight requests to settle.
    #[serde(with = "millis")]
    pub close_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_connections_per_host: 10,
            close_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections_per_host == 0 {
            return Err(ConfigError::InvalidPool("max_connections_per_host must be at least 1"));
        }
        if self.connect_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidPool("timeouts must be non-zero"));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Everything needed to construct a [`Vndb`](crate::Vndb) client.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub origin: Origin,
    /// API token. Blank tokens are treated as absent.
    pub token: Option<String>,
    pub pool: PoolConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("origin", &self.origin)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("pool", &self.pool)
            .finish()
    }
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty());

        let sandbox = match lookup(SANDBOX_ENV) {
            None => false,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" | "no" => false,
                "1" | "true" | "yes" => true,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: SANDBOX_ENV,
                        value,
                    })
                }
            },
        };

        let origin = match lookup(ORIGIN_ENV).filter(|o| !o.trim().is_empty()) {
            Some(url) => Origin::Custom(url),
            None if sandbox => Origin::Sandbox,
            None => Origin::Production,
        };

        let config = Self {
            origin,
            token,
            pool: PoolConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the origin and pool limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin.validate()?;
        self.pool.validate()
    }
}
