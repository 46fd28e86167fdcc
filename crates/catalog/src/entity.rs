//! The generic entity query client.
//!
//! Every searchable collection (`/vn`, `/release`, `/character`, ...) is
//! queried the same way: POST a [`QueryRequest`] body to the collection path
//! and decode the `results` envelope. [`EntityClient`] implements that once;
//! a record type only has to name its endpoint through [`Record`].

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{ApiRequest, ApiTransport, QueryRequest, QueryResponse, Result, VndbId};

/// A record type that can be queried through [`EntityClient`].
pub trait Record: DeserializeOwned + Send + 'static {
    /// Collection path below the API origin, e.g. `"/vn"`.
    const ENDPOINT: &'static str;
}

/// Queries one entity collection over an [`ApiTransport`].
pub struct EntityClient<'a, R> {
    transport: &'a dyn ApiTransport,
    _record: PhantomData<fn() -> R>,
}

impl<'a, R: Record> EntityClient<'a, R> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        Self {
            transport,
            _record: PhantomData,
        }
    }

    /// Collection path this client queries.
    pub fn endpoint(&self) -> &'static str {
        R::ENDPOINT
    }

    /// Runs one page of `request`.
    ///
    /// A blank field selection is sent as `"id"`. Result elements that fail
    /// to decode come back as `None` slots; see [`QueryResponse`].
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse<R>> {
        run_query(self.transport, R::ENDPOINT, request, None).await
    }
}

impl<R> Clone for EntityClient<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for EntityClient<'_, R> {}

impl<R: Record> std::fmt::Debug for EntityClient<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityClient")
            .field("endpoint", &R::ENDPOINT)
            .finish()
    }
}

/// Shared query algorithm for entity and list-scoped queries.
pub(crate) async fn run_query<R: DeserializeOwned>(
    transport: &dyn ApiTransport,
    endpoint: &str,
    request: &QueryRequest,
    user: Option<&VndbId>,
) -> Result<QueryResponse<R>> {
    let body = request.to_body(user)?;
    let call = ApiRequest::post(endpoint, body).with_credential(transport.credential().cloned());
    let envelope = transport.execute(call).await?;
    let page = QueryResponse::from_envelope(envelope)?;
    debug!(
        endpoint,
        results = page.results.len(),
        undecoded = page.undecoded(),
        more = page.more,
        "Query page received"
    );
    Ok(page)
}
