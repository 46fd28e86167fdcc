//! Query descriptions and the paginated response envelope.
//!
//! A [`QueryRequest`] is a plain value: building one never touches the
//! network, and running it never mutates it. The body actually sent is
//! derived from it by [`QueryRequest::to_body`], which is where the
//! never-empty field selection is enforced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{Filter, Result, VndbError, VndbId};

/// Field selection sent when the caller selected nothing.
pub const DEFAULT_FIELDS: &str = "id";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Description of one page of a query against an entity endpoint.
///
/// ```
/// use catalog::{Filter, QueryRequest};
///
/// let query = QueryRequest::new()
///     .with_filters(Filter::id("v17"))
///     .with_fields("id,title,released")
///     .with_results(1);
/// assert_eq!(query.effective_fields(), "id,title,released");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    /// Filter expression; `None` matches every entry.
    pub filters: Option<Filter>,
    /// Comma-separated field selection, e.g. `"id,title,tags{name}"`.
    pub fields: String,
    /// Field to sort on.
    pub sort: Option<String>,
    /// Sort descending.
    pub reverse: bool,
    /// Page size.
    pub results: Option<u32>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Ask the remote to include the total match count.
    pub count: bool,
    /// Ask the remote to echo the filters in compact string form.
    pub compact_filters: bool,
    /// Ask the remote to echo the filters in normalized JSON form.
    pub normalized_filters: bool,
}

impl QueryRequest {
    /// An empty query: all entries, `id` only, remote default page size.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Filter) -> Self {
        self.filters = Some(filters);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = fields.into();
        self
    }

    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>) -> Self {
        self.sort = Some(field.into());
        self
    }

    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    #[must_use]
    pub fn with_results(mut self, results: u32) -> Self {
        self.results = Some(results);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }

    #[must_use]
    pub fn with_compact_filters(mut self) -> Self {
        self.compact_filters = true;
        self
    }

    #[must_use]
    pub fn with_normalized_filters(mut self) -> Self {
        self.normalized_filters = true;
        self
    }

    /// The query for the following page. Stays on the last page at `u32::MAX`.
    #[must_use]
    pub fn next_page(&self) -> Self {
        let mut next = self.clone();
        next.page = Some(self.page.unwrap_or(1).saturating_add(1));
        next
    }

    /// The field selection that will be sent: [`DEFAULT_FIELDS`] when blank.
    pub fn effective_fields(&self) -> &str {
        let trimmed = self.fields.trim();
        if trimmed.is_empty() {
            DEFAULT_FIELDS
        } else {
            trimmed
        }
    }

    /// Builds the JSON body, injecting `user` for list-scoped queries.
    pub fn to_body(&self, user: Option<&VndbId>) -> Result<Value> {
        let body = QueryBody {
            user: user.map(VndbId::as_str),
            filters: self.filters.as_ref(),
            fields: self.effective_fields(),
            sort: self.sort.as_deref(),
            reverse: self.reverse,
            results: self.results,
            page: self.page,
            count: self.count,
            compact_filters: self.compact_filters,
            normalized_filters: self.normalized_filters,
        };
        serde_json::to_value(&body).map_err(VndbError::unserialisable)
    }
}

#[derive(Serialize)]
struct QueryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<&'a Filter>,
    fields: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    reverse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    count: bool,
    #[serde(skip_serializing_if = "is_false")]
    compact_filters: bool,
    #[serde(skip_serializing_if = "is_false")]
    normalized_filters: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One page of query results.
///
/// `results` keeps the remote's order. An element that could not be decoded
/// into `T` is kept as `None` so that one bad row never costs the caller the
/// rest of the page; [`QueryResponse::records`] skips those slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse<T> {
    #[serde(default)]
    pub results: Vec<Option<T>>,
    /// `true` if another page exists.
    #[serde(default)]
    pub more: bool,
    /// Total number of matches, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact_filters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_filters: Option<Filter>,
}

impl<T> QueryResponse<T> {
    /// Decoded records, skipping elements that failed to decode.
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.results.iter().flatten()
    }

    /// Consumes the page, returning only the decoded records.
    pub fn into_records(self) -> Vec<T> {
        self.results.into_iter().flatten().collect()
    }

    /// Number of elements that failed to decode.
    pub fn undecoded(&self) -> usize {
        self.results.iter().filter(|r| r.is_none()).count()
    }
}

impl<T: serde::de::DeserializeOwned> QueryResponse<T> {
    /// Decodes a raw envelope leniently.
    ///
    /// A missing `results` is an empty page and a missing `more` is `false`.
    /// Each element is decoded on its own; failures are logged and become
    /// `None`. The filter echoes are informational and are dropped rather
    /// than failing the page when they cannot be parsed.
    pub fn from_envelope(envelope: Value) -> Result<Self> {
        let Value::Object(mut map) = envelope else {
            return Err(VndbError::unexpected_response(
                "query response is not a JSON object",
            ));
        };

        let results = match map.remove("results") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| decode_element(index, item))
                .collect(),
            Some(_) => {
                return Err(VndbError::unexpected_response(
                    "`results` in query response is not an array",
                ))
            }
        };

        Ok(Self {
            results,
            more: take_bool(&mut map, "more"),
            count: map.remove("count").and_then(|v| v.as_u64()),
            compact_filters: map
                .remove("compact_filters")
                .and_then(|v| v.as_str().map(str::to_owned)),
            normalized_filters: map
                .remove("normalized_filters")
                .and_then(|v| Filter::from_json(&v).ok()),
        })
    }
}

pub(crate) fn decode_element<T: serde::de::DeserializeOwned>(index: usize, item: Value) -> Option<T> {
    if item.is_null() {
        return None;
    }
    match serde_json::from_value(item) {
        Ok(record) => Some(record),
        Err(error) => {
            warn!(index, %error, "Dropping query result that failed to decode");
            None
        }
    }
}

fn take_bool(map: &mut Map<String, Value>, key: &str) -> bool {
    map.remove(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vn;
    use serde_json::json;

    #[test]
    fn test_blank_fields_default_to_id() {
        for fields in ["", "   "] {
            let body = QueryRequest::new().with_fields(fields).to_body(None).unwrap();
            assert_eq!(body["fields"], "id");
        }
    }

    #[test]
    fn test_to_body_does_not_mutate_request() {
        let query = QueryRequest::new();
        let _ = query.to_body(None).unwrap();
        assert_eq!(query.fields, "");
    }

    #[test]
    fn test_body_contains_only_set_options() {
        let body = QueryRequest::new()
            .with_filters(Filter::id("v1"))
            .with_fields("id,title")
            .with_results(1)
            .to_body(None)
            .unwrap();
        assert_eq!(
            body,
            json!({"filters": ["id", "=", "v1"], "fields": "id,title", "results": 1})
        );
    }

    #[test]
    fn test_body_with_every_option() {
        let user = VndbId::new("u2").unwrap();
        let body = QueryRequest::new()
            .with_fields("id")
            .with_sort("rating")
            .reversed()
            .with_results(25)
            .with_page(3)
            .with_count()
            .with_compact_filters()
            .with_normalized_filters()
            .to_body(Some(&user))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "user": "u2",
                "fields": "id",
                "sort": "rating",
                "reverse": true,
                "results": 25,
                "page": 3,
                "count": true,
                "compact_filters": true,
                "normalized_filters": true
            })
        );
    }

    #[test]
    fn test_next_page() {
        assert_eq!(QueryRequest::new().next_page().page, Some(2));
        assert_eq!(QueryRequest::new().with_page(4).next_page().page, Some(5));
    }

    #[test]
    fn test_next_page_saturates_at_last_page() {
        let last = QueryRequest::new().with_page(u32::MAX);
        assert_eq!(last.next_page().page, Some(u32::MAX));
    }

    #[test]
    fn test_empty_envelope_round_trip() {
        let raw = json!({"results": [], "more": false, "count": 0});
        let parsed: QueryResponse<Vn> = serde_json::from_value(raw.clone()).unwrap();
        assert!(parsed.results.is_empty());
        assert!(!parsed.more);
        assert_eq!(parsed.count, Some(0));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), raw);

        let lenient = QueryResponse::<Vn>::from_envelope(raw).unwrap();
        assert_eq!(lenient, parsed);
    }

    #[test]
    fn test_envelope_defaults() {
        let page = QueryResponse::<Vn>::from_envelope(json!({})).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.more);
        assert_eq!(page.count, None);
    }

    #[test]
    fn test_envelope_passes_filter_echoes_through() {
        let page = QueryResponse::<Vn>::from_envelope(json!({
            "results": [],
            "more": true,
            "compact_filters": "03132gja2wzw",
            "normalized_filters": ["id", "=", "v1"]
        }))
        .unwrap();
        assert!(page.more);
        assert_eq!(page.compact_filters.as_deref(), Some("03132gja2wzw"));
        assert_eq!(page.normalized_filters, Some(Filter::id("v1")));
    }

    // A malformed row is deliberately absorbed: availability of the rest of
    // the page wins over strictness for that row.
    #[test]
    fn test_undecodable_element_becomes_absent_slot() {
        let page = QueryResponse::<Vn>::from_envelope(json!({
            "results": [
                {"id": "v1", "title": "First"},
                {"id": "v2", "platforms": "not-an-array"},
                null,
                {"id": "v3", "title": "Third"}
            ],
            "more": false
        }))
        .unwrap();
        assert_eq!(page.results.len(), 4);
        assert!(page.results[1].is_none());
        assert!(page.results[2].is_none());
        assert_eq!(page.undecoded(), 2);

        let ids: Vec<_> = page.records().map(|vn| vn.id.as_str()).collect();
        assert_eq!(ids, ["v1", "v3"]);
    }

    #[test]
    fn test_non_object_envelope_is_rejected() {
        let err = QueryResponse::<Vn>::from_envelope(json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Api);

        let err = QueryResponse::<Vn>::from_envelope(json!({"results": 5})).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Api);
    }
}
