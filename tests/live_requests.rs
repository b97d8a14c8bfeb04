//! Live request executor behavior against local HTTP servers.

mod common;

use common::{refused_url, silent_server, MockServerFixture, SHORT_TIMEOUT};
use dataorch_client::{
    ApiClientBuilder, BackendId, BackendRegistry, Error, ErrorKind, MemoryStore,
};
use mockito::Matcher;
use serde_json::{json, Map, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_bearer_header_only_when_logged_in() {
    let mut fx = MockServerFixture::new().await;
    let store = Arc::new(MemoryStore::new());
    let clients = fx.clients(store.clone());

    let anonymous = fx
        .server
        .mock("GET", "/skills")
        .match_header("authorization", Matcher::Missing)
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"skills":[],"total":0}"#)
        .expect(1)
        .create_async()
        .await;

    let out = clients.opencode_agent.list_skills().await.unwrap();
    assert_eq!(out["total"], 0);
    anonymous.assert_async().await;

    let login = clients.opencode_agent.login("ana@example.com", "pw").unwrap();
    let authed = fx
        .server
        .mock("GET", "/sessions")
        .match_header("authorization", format!("Bearer {}", login.token).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sessions":[]}"#)
        .expect(1)
        .create_async()
        .await;

    clients.opencode_agent.get_sessions().await.unwrap();
    authed.assert_async().await;
}

#[tokio::test]
async fn test_login_on_one_client_authorizes_the_other() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));
    let login = clients.opencode_agent.login("ops@example.com", "").unwrap();

    let mock = fx
        .server
        .mock("POST", "/api/workflow/run")
        .match_header("authorization", format!("Bearer {}", login.token).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"completed","task_results":{},"completed_steps":[],"error":null}"#)
        .create_async()
        .await;

    clients
        .data_platform
        .run_workflow("q", "2025-01-20", Map::new())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_logout_stops_sending_bearer() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));
    clients.opencode_agent.login("ana@example.com", "pw").unwrap();
    clients.opencode_agent.logout().unwrap();

    let mock = fx
        .server
        .mock("GET", "/skills")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    clients.opencode_agent.list_skills().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_workflow_body_merges_extra_config() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));

    let mock = fx
        .server
        .mock("POST", "/api/workflow/run")
        .match_body(Matcher::Json(json!({
            "request": "revenue by product",
            "date": "2025-01-21",
            "dry_run": true
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"completed","task_results":{},"completed_steps":["preflight"],"error":null}"#)
        .create_async()
        .await;

    let mut extra = Map::new();
    extra.insert("dry_run".into(), Value::Bool(true));
    extra.insert("date".into(), Value::String("2025-01-21".into()));
    let out = clients
        .data_platform
        .run_workflow("revenue by product", "2025-01-20", extra)
        .await
        .unwrap();

    assert_eq!(out["completed_steps"], json!(["preflight"]));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_is_surfaced() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));

    let _mock = fx
        .server
        .mock("POST", "/session/chat")
        .with_status(500)
        .with_body(r#"{"detail":"boom"}"#)
        .create_async()
        .await;

    let err = clients
        .opencode_agent
        .chat("hello", None, None)
        .await
        .unwrap_err();
    match err {
        Error::HttpStatus {
            backend,
            status,
            status_text,
            body,
        } => {
            assert_eq!(backend, BackendId::OpencodeAgent);
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
            assert!(body.contains("boom"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_body_decodes_to_null() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));

    let mock = fx
        .server
        .mock("DELETE", "/sessions/ses_42")
        .with_status(204)
        .create_async()
        .await;

    let out = clients.opencode_agent.delete_session("ses_42").await.unwrap();
    assert!(out.is_null());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_json_is_a_serialization_error() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));

    let _mock = fx
        .server
        .mock("GET", "/skills")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = clients.opencode_agent.list_skills().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);
}

#[tokio::test]
async fn test_timeout_aborts_and_does_not_retry() {
    let (url, accepted) = silent_server().await;
    let client = ApiClientBuilder::new()
        .registry(
            BackendRegistry::new()
                .with_base_url(BackendId::OpencodeAgent, &url)
                .unwrap(),
        )
        .store(Arc::new(MemoryStore::new()))
        .request_timeout(SHORT_TIMEOUT)
        .build("opencode_agent")
        .unwrap();

    let start = Instant::now();
    let err = client.chat("anyone there?", None, None).await.unwrap_err();
    let elapsed = start.elapsed();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(elapsed >= SHORT_TIMEOUT);
    assert!(elapsed < Duration::from_secs(5));
    assert!(err.to_string().contains("running"));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = ApiClientBuilder::new()
        .registry(
            BackendRegistry::new()
                .with_base_url(BackendId::OpencodeAgent, &refused_url())
                .unwrap(),
        )
        .store(Arc::new(MemoryStore::new()))
        .build_for(BackendId::OpencodeAgent)
        .unwrap();

    let err = client.list_skills().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_settings_override_redirects_next_call() {
    let mut fx = MockServerFixture::new().await;
    let store = Arc::new(MemoryStore::new());
    let client = ApiClientBuilder::new()
        .registry(
            BackendRegistry::new()
                .with_base_url(BackendId::DataPlatform, &refused_url())
                .unwrap(),
        )
        .store(store)
        .build("data_platform")
        .unwrap();

    // A data platform override names the server root; `/api` is appended.
    client
        .set_base_url_override(&format!("{}/", fx.base_url))
        .unwrap();
    assert_eq!(client.base_url().unwrap(), format!("{}/api", fx.base_url));

    let mock = fx
        .server
        .mock("POST", "/api/workflow/run")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    client
        .run_workflow("q", "2025-01-20", Map::new())
        .await
        .unwrap();
    mock.assert_async().await;

    client.clear_base_url_override().unwrap();
    let err = client
        .run_workflow("q", "2025-01-20", Map::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
