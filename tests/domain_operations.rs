//! Domain operations: construction, auth, sessions and files.

mod common;

use common::MockServerFixture;
use dataorch_client::{
    ApiClient, ApiClientBuilder, BackendId, BackendRegistry, Error, ErrorKind, FileStore,
    MemoryStore, UploadFile,
};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_unknown_backend_fails_at_construction() {
    let err = ApiClientBuilder::new()
        .store(Arc::new(MemoryStore::new()))
        .build("billing")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("Unknown backend: billing"));

    // Also through the convenience constructor, before any store is opened.
    assert!(ApiClient::new("").is_err());
}

#[test]
fn test_login_logout_roundtrip_through_client() {
    let client = ApiClientBuilder::new()
        .registry(BackendRegistry::new())
        .store(Arc::new(MemoryStore::new()))
        .build("opencode_agent")
        .unwrap();

    assert!(!client.is_authenticated().unwrap());
    let resp = client.login("ana@example.com", "whatever").unwrap();
    assert!(resp.success);
    assert!(client.is_authenticated().unwrap());
    assert_eq!(client.current_user().unwrap().unwrap().email, "ana@example.com");
    assert_eq!(client.token().unwrap(), Some(resp.token));

    client.logout().unwrap();
    assert!(!client.is_authenticated().unwrap());
    assert_eq!(client.current_user().unwrap(), None);
}

#[test]
fn test_credential_survives_client_restart() {
    let dir = tempdir().expect("tempdir");
    let build = || {
        ApiClientBuilder::new()
            .registry(BackendRegistry::new())
            .store(Arc::new(FileStore::from_dir(dir.path())))
            .build_for(BackendId::OpencodeAgent)
            .unwrap()
    };

    let first = build();
    first.login("persist@example.com", "pw").unwrap();
    drop(first);

    let second = build();
    assert!(second.is_authenticated().unwrap());
    assert_eq!(
        second.current_user().unwrap().unwrap().email,
        "persist@example.com"
    );
}

#[tokio::test]
async fn test_file_operations_rejected_on_data_platform() {
    let mut fx = MockServerFixture::new().await;
    let untouched_post = fx
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let untouched_get = fx
        .server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let untouched_delete = fx
        .server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));
    let dp = &clients.data_platform;

    let errors = vec![
        dp.upload_file(UploadFile::new("a.txt", "a")).await.unwrap_err(),
        dp.upload_session_files("ses_1", vec![UploadFile::new("a.txt", "a")])
            .await
            .unwrap_err(),
        dp.get_session_files("ses_1").await.unwrap_err(),
        dp.delete_session_file("ses_1", "f_1").await.unwrap_err(),
    ];
    for err in &errors {
        assert!(
            matches!(
                err,
                Error::UnsupportedBackend {
                    backend: BackendId::DataPlatform,
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
    }
    assert!(errors[0].to_string().starts_with("upload_file is only supported"));

    untouched_post.assert_async().await;
    untouched_get.assert_async().await;
    untouched_delete.assert_async().await;
}

#[tokio::test]
async fn test_chat_request_wire_format() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));

    let mock = fx
        .server
        .mock("POST", "/session/chat")
        .match_body(Matcher::Json(json!({
            "parts": [{"type": "text", "text": "load the Q1 sheet"}],
            "agent": "excel",
            "sessionId": "ses_7",
            "no_reply": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"done","response":"done","tool_calls":[{"name":"read_excel"}]}"#)
        .create_async()
        .await;

    let out = clients
        .opencode_agent
        .chat("load the Q1 sheet", Some("excel"), Some("ses_7"))
        .await
        .unwrap();
    assert_eq!(out["tool_calls"][0]["name"], "read_excel");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_session_crud_paths() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));
    let agent = &clients.opencode_agent;

    let create = fx
        .server
        .mock("POST", "/sessions")
        .match_body(Matcher::Json(json!({"title": "Q1 review"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"ses_9","title":"Q1 review"}"#)
        .create_async()
        .await;
    let list = fx
        .server
        .mock("GET", "/sessions")
        .with_status(200)
        .with_body(r#"[{"id":"ses_9"}]"#)
        .create_async()
        .await;
    let delete = fx
        .server
        .mock("DELETE", "/sessions/ses_9")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let created = agent.create_session(json!({"title": "Q1 review"})).await.unwrap();
    assert_eq!(created["id"], "ses_9");
    assert_eq!(agent.get_sessions().await.unwrap()[0]["id"], "ses_9");
    assert_eq!(agent.delete_session("ses_9").await.unwrap()["success"], true);

    create.assert_async().await;
    list.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_upload_file_is_multipart_with_bearer() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));
    let login = clients.opencode_agent.login("ana@example.com", "pw").unwrap();

    let mock = fx
        .server
        .mock("POST", "/upload")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_header("authorization", format!("Bearer {}", login.token).as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="report.csv""#.to_string()),
            Matcher::Regex("region,revenue".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"filePath":"file:/tmp/up/report.csv","fileName":"report.csv","fileSize":22,"mimeType":"text/csv"}"#,
        )
        .create_async()
        .await;

    let uploaded = clients
        .opencode_agent
        .upload_file(UploadFile::new("report.csv", "region,revenue\nEU,100\n").with_mime_type("text/csv"))
        .await
        .unwrap();
    assert_eq!(uploaded.file_path, "file:/tmp/up/report.csv");
    assert_eq!(uploaded.file_size, 22);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_session_file_routes() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));
    let agent = &clients.opencode_agent;

    let upload = fx
        .server
        .mock("POST", "/sessions/ses_3/files")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="files"; filename="a.txt""#.to_string()),
            Matcher::Regex(r#"name="files"; filename="b.txt""#.to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"files":[{"id":"f_a"},{"id":"f_b"}]}"#)
        .create_async()
        .await;
    let list = fx
        .server
        .mock("GET", "/sessions/ses_3/files")
        .with_status(200)
        .with_body(r#"{"files":[{"id":"f_a"},{"id":"f_b"}]}"#)
        .create_async()
        .await;
    let delete = fx
        .server
        .mock("DELETE", "/sessions/ses_3/files/f_a")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let uploaded = agent
        .upload_session_files(
            "ses_3",
            vec![UploadFile::new("a.txt", "alpha"), UploadFile::new("b.txt", "beta")],
        )
        .await
        .unwrap();
    assert_eq!(uploaded["files"].as_array().unwrap().len(), 2);
    assert_eq!(agent.get_session_files("ses_3").await.unwrap()["files"][1]["id"], "f_b");
    assert_eq!(
        agent.delete_session_file("ses_3", "f_a").await.unwrap()["success"],
        true
    );

    upload.assert_async().await;
    list.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_upload_error_status_is_surfaced() {
    let mut fx = MockServerFixture::new().await;
    let clients = fx.clients(Arc::new(MemoryStore::new()));

    let _mock = fx
        .server
        .mock("POST", "/upload")
        .with_status(413)
        .create_async()
        .await;

    let err = clients
        .opencode_agent
        .upload_file(UploadFile::new("big.bin", vec![0u8; 64]))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(413));
}

#[tokio::test]
async fn test_upload_file_from_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# notes").unwrap();

    let file = UploadFile::from_path(&path).await.unwrap();
    assert_eq!(file.file_name, "notes.md");
    assert_eq!(file.len(), 7);
}
