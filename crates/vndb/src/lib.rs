//! HTTP client for the VNDB catalog API.
//!
//! Wraps the [`catalog`] domain crate with a pooled `reqwest` transport and
//! exposes everything through the [`Vndb`] facade.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection pooling, request execution, and response
//! classification live here. Query construction, record shapes, and the
//! error taxonomy come from [`catalog`] and are re-exported.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`ClientConfig`], [`Origin`], [`PoolConfig`] |
//! | [`pool`] | [`HttpPool`] and the owned/borrowed connection lifecycle |
//! | [`executor`] | [`RequestExecutor`], the production `ApiTransport` |
//! | [`client`] | [`Vndb`] facade and [`VndbBuilder`] |
//!
//! ## Connection lifecycle
//!
//! A client built without a pool creates one on first use and closes it in
//! [`Vndb::close`] or when the last clone is dropped. A client given a pool
//! through [`VndbBuilder::http_pool`] uses it as is and never closes it.

pub mod client;
pub mod config;
pub mod executor;
pub mod pool;

pub use client::{Vndb, VndbBuilder};
pub use config::{ClientConfig, ConfigError, Origin, PoolConfig, PRODUCTION_ORIGIN, SANDBOX_ORIGIN};
pub use executor::RequestExecutor;
pub use pool::HttpPool;

// Re-export the domain crate so callers need only one dependency.
pub use catalog::*;
