//! User list clients: list-scoped queries, label lookup, and list mutations.
//!
//! Mutations need a credential with the `listwrite` permission. A missing
//! credential is rejected here, before a request is built; a credential
//! without the permission is rejected by the remote and classified as an
//! authentication failure.

use tracing::{debug, info};

use crate::entity::run_query;
use crate::query::decode_element;
use crate::{
    ApiRequest, ApiTransport, QueryRequest, QueryResponse, Result, RlistUpdate, UlistItem,
    UlistLabel, UlistUpdate, VndbError, VndbId,
};

/// The visual novel list of a user (`/ulist`).
#[derive(Clone, Copy)]
pub struct UlistClient<'a> {
    transport: &'a dyn ApiTransport,
}

impl<'a> UlistClient<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        Self { transport }
    }

    /// Queries `user`'s list. Same contract as
    /// [`EntityClient::query`](crate::EntityClient::query), with `user` added
    /// to the request body.
    pub async fn query(
        &self,
        user: &VndbId,
        request: &QueryRequest,
    ) -> Result<QueryResponse<UlistItem>> {
        run_query(self.transport, "/ulist", request, Some(user)).await
    }

    /// Lists the labels of `user`, or of the token owner when `user` is `None`.
    ///
    /// Labels that fail to decode are skipped.
    pub async fn labels(
        &self,
        user: Option<&VndbId>,
        fields: Option<&str>,
    ) -> Result<Vec<UlistLabel>> {
        let mut call =
            ApiRequest::get("/ulist_labels").with_credential(self.transport.credential().cloned());
        if let Some(user) = user {
            call = call.with_query("user", user.as_str());
        }
        if let Some(fields) = fields.filter(|f| !f.trim().is_empty()) {
            call = call.with_query("fields", fields);
        }

        let mut body = self.transport.execute(call).await?;
        let labels = match body.get_mut("labels").map(serde_json::Value::take) {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .filter_map(|(index, item)| decode_element(index, item))
                .collect(),
            Some(_) => {
                return Err(VndbError::unexpected_response(
                    "`labels` in ulist_labels response is not an array",
                ))
            }
        };
        Ok(labels)
    }

    /// Adds or modifies the entry for visual novel `vn`.
    pub async fn update_entry(&self, vn: &VndbId, payload: &UlistUpdate) -> Result<()> {
        let body = serde_json::to_value(payload).map_err(VndbError::unserialisable)?;
        patch_entry(self.transport, "ulist", vn, body).await
    }

    /// Removes visual novel `vn` from the list.
    pub async fn delete_entry(&self, vn: &VndbId) -> Result<()> {
        remove_entry(self.transport, "ulist", vn).await
    }
}

impl std::fmt::Debug for UlistClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UlistClient").finish_non_exhaustive()
    }
}

/// The release list of the token owner (`/rlist`).
#[derive(Clone, Copy)]
pub struct RlistClient<'a> {
    transport: &'a dyn ApiTransport,
}

impl<'a> RlistClient<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        Self { transport }
    }

    /// Adds or modifies the entry for release `release`.
    pub async fn update_entry(&self, release: &VndbId, payload: &RlistUpdate) -> Result<()> {
        let body = serde_json::to_value(payload).map_err(VndbError::unserialisable)?;
        patch_entry(self.transport, "rlist", release, body).await
    }

    /// Removes release `release` from the list.
    pub async fn delete_entry(&self, release: &VndbId) -> Result<()> {
        remove_entry(self.transport, "rlist", release).await
    }
}

impl std::fmt::Debug for RlistClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RlistClient").finish_non_exhaustive()
    }
}

async fn patch_entry(
    transport: &dyn ApiTransport,
    list: &str,
    id: &VndbId,
    body: serde_json::Value,
) -> Result<()> {
    let credential = transport.require_credential(&format!("{list} updates"))?;
    let call = ApiRequest::patch(format!("/{list}/{id}"), body).with_credential(Some(credential));
    transport.execute(call).await?;
    info!(list, %id, "List entry updated");
    Ok(())
}

async fn remove_entry(transport: &dyn ApiTransport, list: &str, id: &VndbId) -> Result<()> {
    let credential = transport.require_credential(&format!("{list} deletions"))?;
    let call = ApiRequest::delete(format!("/{list}/{id}")).with_credential(Some(credential));
    transport.execute(call).await?;
    debug!(list, %id, "List entry deleted");
    Ok(())
}
