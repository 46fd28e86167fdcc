//! Integration tests for the vndb client against a mock API.
//!
//! These tests use wiremock to stand in for the remote and verify request
//! shapes, response classification, and the connection lifecycle.

use std::time::{Duration, Instant};

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use vndb::{
    ErrorKind, Filter, HttpPool, Origin, PoolConfig, QueryRequest, ReleaseStatus, RlistUpdate,
    UlistUpdate, Vndb, VndbError, VndbId, Vote,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("vndb=debug,catalog=debug")
        .with_test_writer()
        .try_init();
}

fn client(server: &MockServer) -> Vndb {
    init_tracing();
    Vndb::builder()
        .origin(Origin::Custom(server.uri()))
        .build()
        .unwrap()
}

fn authed_client(server: &MockServer) -> Vndb {
    init_tracing();
    Vndb::builder()
        .origin(Origin::Custom(server.uri()))
        .token("secret-token")
        .build()
        .unwrap()
}

fn id(raw: &str) -> VndbId {
    VndbId::new(raw).unwrap()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_vn_query_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vn"))
        .and(body_json(json!({
            "filters": ["id", "=", "v1"],
            "fields": "id,title",
            "results": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "v1", "title": "Test"}],
            "more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = QueryRequest::new()
        .with_filters(Filter::id("v1"))
        .with_fields("id,title")
        .with_results(1);
    let page = client(&server).vn().query(&request).await.unwrap();

    assert_eq!(page.results.len(), 1);
    let vn = page.results[0].as_ref().unwrap();
    assert_eq!(vn.id, "v1");
    assert_eq!(vn.title.as_deref(), Some("Test"));
    assert!(!page.more);
}

#[tokio::test]
async fn test_empty_field_selection_is_sent_as_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/producer"))
        .and(body_json(json!({"fields": "id"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [], "more": false, "count": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .producer()
        .query(&QueryRequest::new().with_fields("  "))
        .await
        .unwrap();
    assert!(page.results.is_empty());
    assert_eq!(page.count, Some(0));
}

#[tokio::test]
async fn test_bearer_header_only_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    client(&server).tag().query(&QueryRequest::new()).await.unwrap();
    authed_client(&server)
        .tag()
        .query(&QueryRequest::new())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert!(received[0].headers.get("authorization").is_none());
    assert_eq!(
        received[1].headers.get("authorization").unwrap(),
        "Bearer secret-token"
    );
}

#[tokio::test]
async fn test_ulist_query_injects_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ulist"))
        .and(body_json(json!({"user": "u2", "fields": "vote", "sort": "vote"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "v17", "vote": 90}],
            "more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .ulist()
        .query(
            &id("u2"),
            &QueryRequest::new().with_fields("vote").with_sort("vote"),
        )
        .await
        .unwrap();
    assert_eq!(page.results[0].as_ref().unwrap().vote, Some(90));
    assert!(page.more);
}

// ---------------------------------------------------------------------------
// Response classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_status_codes_are_classified() {
    let cases = [
        (400, json!({"error": "Invalid filter"}), ErrorKind::InvalidRequest),
        (400, json!({"error": "Too much data selected"}), ErrorKind::TooMuchDataSelected),
        (401, json!({"error": "Invalid token"}), ErrorKind::Authentication),
        (403, json!({"error": "Forbidden"}), ErrorKind::Authentication),
        (404, json!({"error": "Not found"}), ErrorKind::NotFound),
        (413, json!({"error": "Too large"}), ErrorKind::TooMuchDataSelected),
        (429, json!({"error": "Throttled"}), ErrorKind::RateLimit),
        (500, json!({"error": "Oops"}), ErrorKind::Server),
        (503, json!({"message": "Maintenance"}), ErrorKind::Server),
        (418, json!({"error": "Teapot"}), ErrorKind::Api),
    ];

    for (status, body, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vn"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .vn()
            .query(&QueryRequest::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), expected, "status {status}");
        assert_eq!(err.status(), Some(status), "status {status}");
    }
}

#[tokio::test]
async fn test_plain_text_error_message_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vn"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client(&server)
        .vn()
        .query(&QueryRequest::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(!err.is_transport());
    assert!(err.to_string().contains("Bad Gateway"));
    assert!(err.retry_policy().is_retryable());
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).get_stats().await.unwrap_err();
    assert!(matches!(err, VndbError::MalformedResponse { status: 200, .. }));
}

#[tokio::test]
async fn test_non_array_results_is_unexpected_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": "nope"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .vn()
        .query(&QueryRequest::new())
        .await
        .unwrap_err();
    assert!(matches!(err, VndbError::UnexpectedResponse { .. }));
    assert_eq!(err.kind(), ErrorKind::Api);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = Vndb::builder()
        .origin(Origin::Custom(format!("http://127.0.0.1:{port}")))
        .build()
        .unwrap();

    let err = client.vn().query(&QueryRequest::new()).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.kind(), ErrorKind::Server);
    assert_eq!(err.status(), None);
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ulist_update_sends_patch_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/ulist/v17"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_json(json!({"vote": 85, "notes": "Quick test entry."})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let update = UlistUpdate::new()
        .vote(Vote::new(85).unwrap())
        .notes("Quick test entry.");
    authed_client(&server)
        .ulist()
        .update_entry(&id("v17"), &update)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rlist_update_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rlist/r12"))
        .and(body_json(json!({"status": 2})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rlist/r12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    client
        .rlist()
        .update_entry(&id("r12"), &RlistUpdate::new().status(ReleaseStatus::Obtained))
        .await
        .unwrap();
    client.rlist().delete_entry(&id("r12")).await.unwrap();
}

#[tokio::test]
async fn test_mutations_without_token_make_no_request() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let update = UlistUpdate::new().notes("x");

    let results = [
        client.ulist().update_entry(&id("v17"), &update).await,
        client.ulist().delete_entry(&id("v17")).await,
        client
            .rlist()
            .update_entry(&id("r12"), &RlistUpdate::new().status(ReleaseStatus::Pending))
            .await,
        client.rlist().delete_entry(&id("r12")).await,
    ];
    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status(), None);
    }
    assert_eq!(
        client.get_authinfo().await.unwrap_err().kind(),
        ErrorKind::Authentication
    );
}

#[tokio::test]
async fn test_rejected_token_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/ulist/v17"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"id": "auth", "msg": "x"})))
        .mount(&server)
        .await;

    let err = authed_client(&server)
        .ulist()
        .delete_entry(&id("v17"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.status(), Some(401));
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_user_uses_repeated_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(query_param("q", "u2"))
        .and(query_param("fields", "lengthvotes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "u2": {"id": "u2", "username": "yorhel", "lengthvotes": 10},
            "ghost": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client(&server)
        .get_user(&["u2", "ghost"], Some("lengthvotes"))
        .await
        .unwrap();
    assert_eq!(users["u2"].as_ref().unwrap().username, "yorhel");
    assert!(users["ghost"].is_none());

    let received = server.received_requests().await.unwrap();
    let query = received[0].url.query().unwrap_or_default().to_owned();
    assert!(query.contains("q=u2"));
    assert!(query.contains("q=ghost"));
}

#[tokio::test]
async fn test_ulist_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ulist_labels"))
        .and(query_param("user", "u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "labels": [
                {"id": 1, "label": "Playing", "private": false},
                {"id": 7, "label": "Voted", "private": false}
            ]
        })))
        .mount(&server)
        .await;

    let labels = client(&server)
        .ulist()
        .labels(Some(&id("u2")), None)
        .await
        .unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[1].label, "Voted");
}

#[tokio::test]
async fn test_empty_success_body_decodes_as_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schema"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert_eq!(client(&server).get_schema().await.unwrap(), json!({}));
}

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_close_is_idempotent_and_pool_reopens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vn": 3})))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.owns_connection());
    client.get_stats().await.unwrap();
    let first = client.connection_pool().await.unwrap();

    client.close().await;
    client.close().await;
    assert!(first.is_closed());
    assert!(!first.has_client());

    assert_eq!(client.get_stats().await.unwrap().vn, 3);
    let second = client.connection_pool().await.unwrap();
    assert!(!first.ptr_eq(&second));
}

#[tokio::test]
async fn test_close_releases_keep_alive_connection() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client hung up before sending a request");
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                  Content-Length: 2\r\nConnection: keep-alive\r\n\r\n{}",
            )
            .await
            .unwrap();

        // Wait for the client side to hang up.
        tokio::time::timeout(Duration::from_secs(2), socket.read(&mut buf)).await
    });

    init_tracing();
    let client = Vndb::builder()
        .origin(Origin::Custom(origin))
        .build()
        .unwrap();
    assert_eq!(client.get_schema().await.unwrap(), json!({}));
    client.close().await;

    let outcome = server.await.unwrap();
    assert!(
        matches!(outcome, Ok(Ok(0))),
        "connection still open after close: {outcome:?}"
    );
    drop(client);
}

#[tokio::test]
async fn test_borrowed_pool_survives_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let pool = HttpPool::new(&PoolConfig::default()).unwrap();
    {
        let client = Vndb::builder()
            .origin(Origin::Custom(server.uri()))
            .http_pool(pool.clone())
            .build()
            .unwrap();
        client.get_stats().await.unwrap();
        client.close().await;
    }
    assert!(!pool.is_closed());

    pool.close(Duration::from_millis(100)).await;
    let client = Vndb::builder()
        .origin(Origin::Custom(server.uri()))
        .http_pool(pool)
        .build()
        .unwrap();
    let err = client.get_stats().await.unwrap_err();
    assert!(matches!(err, VndbError::Lifecycle { .. }));
}

#[tokio::test]
async fn test_close_does_not_cancel_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vn"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"id": "v1"}], "more": false}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    init_tracing();
    let client = Vndb::builder()
        .origin(Origin::Custom(server.uri()))
        .pool_config(PoolConfig {
            close_timeout: Duration::from_millis(50),
            ..PoolConfig::default()
        })
        .build()
        .unwrap();

    let background = client.clone();
    let in_flight =
        tokio::spawn(async move { background.vn().query(&QueryRequest::new()).await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    client.close().await;
    assert!(started.elapsed() < Duration::from_millis(400));

    let page = in_flight.await.unwrap().unwrap();
    assert_eq!(page.results[0].as_ref().unwrap().id, "v1");
}

#[tokio::test]
async fn test_concurrent_queries_share_one_pool() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/release"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(6)
        .mount(&server)
        .await;

    let client = client(&server);
    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.release().query(&QueryRequest::new()).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let pool = client.connection_pool().await.unwrap();
    assert_eq!(pool.in_flight(), 0);
}
