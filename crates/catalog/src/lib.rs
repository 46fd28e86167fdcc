//! Domain crate for the VNDB catalog client.
//!
//! This crate contains the record shapes, the query model, the error
//! taxonomy, and the query and mutation clients. The clients are written
//! against the [`ApiTransport`] port; the `vndb` crate supplies the HTTP
//! implementation and owns the connection pool.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! decides *what* is sent and how responses are interpreted; the transport
//! decides *how* bytes move.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`errors`] | [`VndbError`] taxonomy and status classification |
//! | [`identifiers`] | [`VndbId`] and [`Credential`] |
//! | [`types`] | Value types with invariants (`Vote`, `ReleaseDate`, ...) |
//! | [`filter`] | Recursive [`Filter`] expressions |
//! | [`query`] | [`QueryRequest`] and the [`QueryResponse`] envelope |
//! | [`records`] | Passive record shapes |
//! | [`payloads`] | List mutation bodies |
//! | [`port`] | [`ApiTransport`] and [`ApiRequest`] |
//! | [`entity`] | Generic [`EntityClient`] |
//! | [`lists`] | [`UlistClient`] and [`RlistClient`] |
//! | [`resources`] | `/schema`, `/stats`, `/user`, `/authinfo` |

pub mod entity;
pub mod errors;
pub mod filter;
pub mod identifiers;
pub mod lists;
pub mod payloads;
pub mod port;
pub mod query;
pub mod records;
pub mod resources;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use entity::{EntityClient, Record};
pub use errors::{ErrorKind, Result, RetryPolicy, VndbError};
pub use filter::{Filter, FilterValue, Operator};
pub use identifiers::{Credential, VndbId};
pub use lists::{RlistClient, UlistClient};
pub use payloads::{RlistUpdate, UlistUpdate};
pub use port::{ApiRequest, ApiTransport, HttpMethod};
pub use query::{QueryRequest, QueryResponse, DEFAULT_FIELDS};
pub use records::{
    AuthInfo, Character, CharacterTrait, CharacterVn, Extlink, Image, Producer, ProducerRef,
    Quote, QuoteCharacter, QuoteVn, Release, ReleaseMedia, ReleaseProducer, ReleaseVn, Staff,
    StaffAlias, Stats, Tag, Title, Trait, UlistItem, UlistLabel, UlistLabelRef, UlistRelease,
    User, Vn, VnTag,
};
pub use types::{ReleaseDate, ReleaseStatus, Timestamp, Vote};
