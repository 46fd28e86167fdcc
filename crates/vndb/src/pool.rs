//! Connection pool and its lifecycle.
//!
//! [`HttpPool`] is a cheaply clonable handle around one `reqwest::Client`
//! plus a semaphore capping concurrent requests per host. Clones share the
//! same pool; [`HttpPool::ptr_eq`] tells whether two handles are one pool.
//!
//! [`Connection`] decides who owns the pool a client uses:
//!
//! - **Owned**: created lazily on first use from a [`PoolConfig`], shared by
//!   every concurrent caller, and closed by [`Connection::close`] or on drop.
//! - **Borrowed**: supplied by the caller and never closed by the client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use catalog::{Result, VndbError};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::config::PoolConfig;

const USER_AGENT: &str = concat!("vndb-rs/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// HttpPool
// ---------------------------------------------------------------------------

/// Shared HTTP connection pool.
#[derive(Clone)]
pub struct HttpPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    /// Taken on close so idle keep-alive connections are dropped.
    http: StdMutex<Option<reqwest::Client>>,
    permits: Arc<Semaphore>,
    limit: u32,
    closed: AtomicBool,
}

/// A permit to run one request on the pool.
///
/// Holding the lease counts the request as in flight; dropping it frees the
/// slot.
pub(crate) struct Lease {
    pub(crate) http: reqwest::Client,
    _permit: OwnedSemaphorePermit,
}

impl HttpPool {
    /// Builds a pool with the timeouts and per-host limit from `config`.
    pub fn new(config: &PoolConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.max_connections_per_host)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| VndbError::lifecycle(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::from_client(http, config.max_connections_per_host))
    }

    /// Wraps an existing `reqwest::Client`, allowing at most
    /// `max_connections_per_host` concurrent requests through it.
    pub fn from_client(http: reqwest::Client, max_connections_per_host: usize) -> Self {
        let limit = u32::try_from(max_connections_per_host.max(1)).unwrap_or(u32::MAX);
        Self {
            inner: Arc::new(PoolInner {
                http: StdMutex::new(Some(http)),
                permits: Arc::new(Semaphore::new(limit as usize)),
                limit,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Whether [`close`](Self::close) has been called on this pool.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Whether both handles refer to the same pool.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Upper bound on concurrent requests.
    pub fn max_connections(&self) -> usize {
        self.inner.limit as usize
    }

    /// Requests currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.max_connections()
            .saturating_sub(self.inner.permits.available_permits())
    }

    /// Waits for a free slot and returns a lease on the client.
    pub(crate) async fn checkout(&self) -> Result<Lease> {
        if self.is_closed() {
            return Err(VndbError::lifecycle("connection pool is closed"));
        }
        let permit = self
            .inner
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| VndbError::lifecycle("connection pool closed while waiting for a slot"))?;
        let http = self
            .client()
            .ok_or_else(|| VndbError::lifecycle("connection pool is closed"))?;
        Ok(Lease {
            http,
            _permit: permit,
        })
    }

    fn client(&self) -> Option<reqwest::Client> {
        self.inner
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drops the pool's client. Leases still running keep their own handle,
    /// and the underlying connections close once the last one finishes.
    fn release_client(&self) {
        self.inner
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Whether the pool still holds its HTTP client.
    pub fn has_client(&self) -> bool {
        self.client().is_some()
    }

    /// Closes the pool.
    ///
    /// New requests are refused at once. In-flight requests are given up to
    /// `grace` to finish; they are not cancelled when the wait runs out.
    /// Returns `false` if the pool was already closed.
    pub async fn close(&self, grace: Duration) -> bool {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return false;
        }

        let drain = self
            .inner
            .permits
            .clone()
            .acquire_many_owned(self.inner.limit);
        match tokio::time::timeout(grace, drain).await {
            Ok(Ok(_all)) => debug!("Connection pool drained"),
            Ok(Err(e)) => debug!(error = %e, "Connection pool drain interrupted"),
            Err(_) => debug!(
                in_flight = self.in_flight(),
                grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                "Requests still in flight at close timeout; leaving them to finish"
            ),
        }
        self.inner.permits.close();
        self.release_client();
        debug!("Connection pool closed");
        true
    }

    /// Closes without waiting. Used when the owning client is dropped.
    fn close_now(&self) -> bool {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.inner.permits.close();
        self.release_client();
        debug!(in_flight = self.in_flight(), "Connection pool closed on drop");
        true
    }
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool")
            .field("max_connections", &self.max_connections())
            .field("in_flight", &self.in_flight())
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Ownership of the pool a client sends requests through.
pub(crate) enum Connection {
    Owned {
        config: PoolConfig,
        slot: Mutex<Option<HttpPool>>,
    },
    Borrowed(HttpPool),
}

impl Connection {
    pub(crate) fn owned(config: PoolConfig) -> Self {
        Connection::Owned {
            config,
            slot: Mutex::new(None),
        }
    }

    pub(crate) fn borrowed(pool: HttpPool) -> Self {
        Connection::Borrowed(pool)
    }

    pub(crate) fn is_owned(&self) -> bool {
        matches!(self, Connection::Owned { .. })
    }

    /// Returns an open pool.
    ///
    /// An owned connection creates its pool on first use, and again after a
    /// close. Concurrent first callers all receive the same pool. A borrowed
    /// pool that has been closed by its owner is an error.
    pub(crate) async fn acquire(&self) -> Result<HttpPool> {
        match self {
            Connection::Borrowed(pool) => {
                if pool.is_closed() {
                    Err(VndbError::lifecycle("supplied connection pool is closed"))
                } else {
                    Ok(pool.clone())
                }
            }
            Connection::Owned { config, slot } => {
                let mut slot = slot.lock().await;
                if let Some(pool) = slot.as_ref().filter(|p| !p.is_closed()) {
                    return Ok(pool.clone());
                }
                let pool = HttpPool::new(config)?;
                debug!(
                    max_connections = pool.max_connections(),
                    "Created connection pool"
                );
                *slot = Some(pool.clone());
                Ok(pool)
            }
        }
    }

    /// Closes an owned pool; a borrowed pool is left untouched.
    ///
    /// Returns `true` only when this call shut a pool down.
    pub(crate) async fn close(&self) -> bool {
        let Connection::Owned { config, slot } = self else {
            debug!("Connection pool is borrowed; leaving it open");
            return false;
        };
        let pool = slot.lock().await.take();
        match pool {
            Some(pool) => pool.close(config.close_timeout).await,
            None => false,
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Connection::Owned { slot, .. } = self {
            if let Some(pool) = slot.get_mut().as_ref() {
                pool.close_now();
            }
        }
    }
}
