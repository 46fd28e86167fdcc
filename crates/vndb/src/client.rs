//! The [`Vndb`] facade: one configured client exposing every endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog::{
    resources, ApiTransport, AuthInfo, Character, Credential, EntityClient, Producer, Quote,
    Record, Release, Result, RlistClient, Staff, Stats, Tag, Trait, UlistClient, User, Vn,
};
use serde_json::Value;
use tracing::info;

use crate::config::{ClientConfig, ConfigError, Origin, PoolConfig};
use crate::executor::RequestExecutor;
use crate::pool::{Connection, HttpPool};

/// Client for the VNDB API.
///
/// Cloning is cheap; clones share the executor and its connection pool.
///
/// # Example
///
/// ```no_run
/// use vndb::{Filter, QueryRequest, Vndb};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Vndb::builder().token("my-token").build()?;
///
/// let request = QueryRequest::new()
///     .with_filters(Filter::id("v17"))
///     .with_fields("title, released");
/// let page = client.vn().query(&request).await?;
/// for vn in page.records() {
///     println!("{}: {:?}", vn.id, vn.title);
/// }
///
/// client.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Vndb {
    executor: Arc<RequestExecutor>,
}

impl Vndb {
    /// Creates a client that owns its connection pool.
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        VndbBuilder::from_config(config).build()
    }

    /// Creates a client configured from the environment.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn builder() -> VndbBuilder {
        VndbBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }

    pub fn has_credential(&self) -> bool {
        self.executor.credential().is_some()
    }

    /// Whether this client created (and will close) its pool.
    pub fn owns_connection(&self) -> bool {
        self.executor.owns_connection()
    }

    /// The pool requests currently go through, creating it if needed.
    pub async fn connection_pool(&self) -> Result<HttpPool> {
        self.executor.pool().await
    }

    /// The transport shared by every sub-client.
    pub fn transport(&self) -> &dyn ApiTransport {
        &*self.executor
    }

    // -----------------------------------------------------------------------
    // Entity queries
    // -----------------------------------------------------------------------

    /// Query client for any record type.
    pub fn entity<R: Record>(&self) -> EntityClient<'_, R> {
        EntityClient::new(self.transport())
    }

    /// `POST /vn`
    pub fn vn(&self) -> EntityClient<'_, Vn> {
        self.entity()
    }

    /// `POST /release`
    pub fn release(&self) -> EntityClient<'_, Release> {
        self.entity()
    }

    /// `POST /producer`
    pub fn producer(&self) -> EntityClient<'_, Producer> {
        self.entity()
    }

    /// `POST /character`
    pub fn character(&self) -> EntityClient<'_, Character> {
        self.entity()
    }

    /// `POST /staff`
    pub fn staff(&self) -> EntityClient<'_, Staff> {
        self.entity()
    }

    /// `POST /tag`
    pub fn tag(&self) -> EntityClient<'_, Tag> {
        self.entity()
    }

    /// `POST /trait`
    pub fn trait_(&self) -> EntityClient<'_, Trait> {
        self.entity()
    }

    /// `POST /quote`
    pub fn quote(&self) -> EntityClient<'_, Quote> {
        self.entity()
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    /// User visual novel list: query, labels, update, delete.
    pub fn ulist(&self) -> UlistClient<'_> {
        UlistClient::new(self.transport())
    }

    /// User release list: update, delete.
    pub fn rlist(&self) -> RlistClient<'_> {
        RlistClient::new(self.transport())
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// `GET /schema`
    pub async fn get_schema(&self) -> Result<Value> {
        resources::schema(self.transport()).await
    }

    /// `GET /stats`
    pub async fn get_stats(&self) -> Result<Stats> {
        resources::stats(self.transport()).await
    }

    /// `GET /user` for each id or username in `queries`.
    pub async fn get_user<S: AsRef<str>>(
        &self,
        queries: &[S],
        fields: Option<&str>,
    ) -> Result<BTreeMap<String, Option<User>>> {
        resources::users(self.transport(), queries, fields).await
    }

    /// `GET /authinfo`; requires a token.
    pub async fn get_authinfo(&self) -> Result<AuthInfo> {
        resources::authinfo(self.transport()).await
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Closes the pool if this client owns it. A borrowed pool is untouched.
    ///
    /// Idempotent. A later request on an owned client opens a fresh pool.
    pub async fn close(&self) {
        if self.executor.close().await {
            info!(base_url = %self.base_url(), "Client closed");
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds a [`Vndb`] client.
#[derive(Debug, Default)]
pub struct VndbBuilder {
    config: ClientConfig,
    pool: Option<HttpPool>,
}

impl VndbBuilder {
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config, pool: None }
    }

    /// API token sent as a bearer credential.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Targets the sandbox deployment.
    #[must_use]
    pub fn sandbox(self) -> Self {
        self.origin(Origin::Sandbox)
    }

    #[must_use]
    pub fn origin(mut self, origin: Origin) -> Self {
        self.config.origin = origin;
        self
    }

    /// Limits of the pool the client creates. Ignored with [`http_pool`](Self::http_pool).
    #[must_use]
    pub fn pool_config(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    /// Sends requests through a caller-owned pool. The client never closes it.
    #[must_use]
    pub fn http_pool(mut self, pool: HttpPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn build(self) -> std::result::Result<Vndb, ConfigError> {
        self.config.validate()?;

        let credential = self.config.token.and_then(Credential::new);
        let connection = match self.pool {
            Some(pool) => Connection::borrowed(pool),
            None => Connection::owned(self.config.pool),
        };
        let executor = RequestExecutor::new(self.config.origin.base_url(), credential, connection);

        info!(
            base_url = %executor.base_url(),
            authenticated = executor.credential().is_some(),
            owns_connection = executor.owns_connection(),
            "VNDB client created"
        );
        Ok(Vndb {
            executor: Arc::new(executor),
        })
    }
}
