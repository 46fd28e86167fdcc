//! Single-object resources: `/schema`, `/stats`, `/user`, `/authinfo`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::query::decode_element;
use crate::{ApiRequest, ApiTransport, AuthInfo, Result, Stats, User, VndbError};

/// `GET /schema`: the remote's self-description, returned untouched.
pub async fn schema(transport: &dyn ApiTransport) -> Result<Value> {
    transport
        .execute(ApiRequest::get("/schema").with_credential(transport.credential().cloned()))
        .await
}

/// `GET /stats`: database-wide entry counts.
pub async fn stats(transport: &dyn ApiTransport) -> Result<Stats> {
    let body = transport
        .execute(ApiRequest::get("/stats").with_credential(transport.credential().cloned()))
        .await?;
    decode_object(body, "stats")
}

/// `GET /user`: looks up users by id (`"u2"`) or username.
///
/// The result maps each query string to its user. Unknown users come back
/// as `None`, and so does an entry that fails to decode; neither fails the
/// lookup for the other keys.
pub async fn users<S: AsRef<str>>(
    transport: &dyn ApiTransport,
    queries: &[S],
    fields: Option<&str>,
) -> Result<BTreeMap<String, Option<User>>> {
    let mut call = ApiRequest::get("/user").with_credential(transport.credential().cloned());
    for q in queries {
        call = call.with_query("q", q.as_ref());
    }
    if let Some(fields) = fields.filter(|f| !f.trim().is_empty()) {
        call = call.with_query("fields", fields);
    }

    let Value::Object(map) = transport.execute(call).await? else {
        return Err(VndbError::unexpected_response("user response is not a JSON object"));
    };
    Ok(map
        .into_iter()
        .enumerate()
        .map(|(index, (key, value))| (key, decode_element(index, value)))
        .collect())
}

/// `GET /authinfo`: the owner and permissions of the configured token.
///
/// Fails locally, without a request, when no token is configured.
pub async fn authinfo(transport: &dyn ApiTransport) -> Result<AuthInfo> {
    let credential = transport.require_credential("/authinfo")?;
    let body = transport
        .execute(ApiRequest::get("/authinfo").with_credential(Some(credential)))
        .await?;
    decode_object(body, "authinfo")
}

fn decode_object<T: serde::de::DeserializeOwned>(body: Value, what: &str) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| VndbError::unexpected_response(format!("{what} response: {e}")))
}
