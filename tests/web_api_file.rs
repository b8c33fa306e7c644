//! Web API File Tests
//!
//! Integration tests for the upload, list, info, download, view and delete
//! endpoints.

use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use filebox::web::handlers::AppState;
use filebox::web::router::create_router;
use filebox::FileStore;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a test server over a temporary store.
fn create_test_server_with_limit(max_upload_size: u64) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::open(temp_dir.path()).expect("Failed to open store");

    let app_state = Arc::new(AppState::new(store).with_max_upload_size(max_upload_size));
    let router = create_router(app_state, &[]);

    let server = TestServer::new(router).expect("Failed to create test server");
    (server, temp_dir)
}

fn create_test_server() -> (TestServer, TempDir) {
    create_test_server_with_limit(1024 * 1024)
}

fn file_form(content: &[u8], filename: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(filename)
            .mime_type(mime_type),
    )
}

/// Upload a file and return the `file` object of the response.
async fn upload(server: &TestServer, content: &[u8], filename: &str) -> Value {
    let response = server
        .post("/api/upload")
        .multipart(file_form(content, filename, "text/plain"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    body["file"].clone()
}

fn file_id(file: &Value) -> String {
    file["id"].as_str().unwrap().to_string()
}

/// Names of the entries in the store root, excluding the staging directory.
fn stored_names(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .map(|e| e.file_name().into_string().unwrap())
        .filter(|n| !n.starts_with('.'))
        .collect()
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_success() {
    let (server, dir) = create_test_server();

    let file = upload(&server, b"Hello, World!", "hello.txt").await;

    let id = file_id(&file);
    assert!(id.ends_with(".txt"));
    assert_eq!(file["originalName"], "hello.txt");
    assert_eq!(file["size"], 13);
    assert_eq!(file["mimetype"], "text/plain");
    assert_eq!(file["downloadUrl"], format!("/api/download/{}", id));
    assert!(file["uploadDate"].as_str().unwrap().ends_with('Z'));

    assert_eq!(stored_names(&dir), vec![id]);
}

#[tokio::test]
async fn test_upload_id_format() {
    let (server, _dir) = create_test_server();

    let file = upload(&server, b"%PDF", "report.final.pdf").await;
    let id = file_id(&file);

    let stem = id.strip_suffix(".pdf").unwrap();
    let (millis, suffix) = stem.split_once('-').unwrap();
    assert!(millis.parse::<u64>().is_ok());
    assert!(suffix.parse::<u32>().unwrap() <= 1_000_000_000);
}

#[tokio::test]
async fn test_upload_without_extension() {
    let (server, _dir) = create_test_server();

    let file = upload(&server, b"data", "Makefile").await;
    assert!(!file_id(&file).contains('.'));
}

#[tokio::test]
async fn test_upload_no_file_part() {
    let (server, dir) = create_test_server();

    let form = MultipartForm::new().add_text("description", "no file here");
    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert!(stored_names(&dir).is_empty());
}

#[tokio::test]
async fn test_upload_wrong_field_name() {
    let (server, _dir) = create_test_server();

    let form = MultipartForm::new().add_part(
        "attachment",
        Part::bytes(b"data".to_vec()).file_name("data.txt"),
    );
    let response = server.post("/api/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_not_multipart() {
    let (server, _dir) = create_test_server();

    let response = server.post("/api/upload").text("just text").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_upload_too_large_leaves_nothing() {
    let (server, dir) = create_test_server_with_limit(16);

    let response = server
        .post("/api/upload")
        .multipart(file_form(&[0xAB; 64], "big.bin", "application/octet-stream"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("too large"));

    assert!(stored_names(&dir).is_empty());
    assert_eq!(
        std::fs::read_dir(dir.path().join(filebox::file::STAGING_DIR))
            .unwrap()
            .count(),
        0
    );

    let list: Value = server.get("/api/files").await.json();
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_at_limit() {
    let (server, _dir) = create_test_server_with_limit(16);

    let response = server
        .post("/api/upload")
        .multipart(file_form(&[0x01; 16], "exact.bin", "application/octet-stream"))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_upload_same_name_twice() {
    let (server, _dir) = create_test_server();

    let first = upload(&server, b"first version", "notes.txt").await;
    let second = upload(&server, b"second version", "notes.txt").await;

    let first_id = file_id(&first);
    let second_id = file_id(&second);
    assert_ne!(first_id, second_id);

    let response = server.get(&format!("/api/download/{}", first_id)).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"first version");

    let response = server.get(&format!("/api/download/{}", second_id)).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"second version");
}

#[tokio::test]
async fn test_upload_ignores_truncated_trailing_part() {
    let (server, dir) = create_test_server();

    let body = concat!(
        "--XB\r\n",
        "Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "hello\r\n",
        "--XB\r\n",
        "Content-Disposition: form-data; name=\"file\"; filename=\"b.txt\"\r\n",
        "\r\n",
        "trunc",
    );
    let response = server
        .post("/api/upload")
        .bytes(Bytes::from_static(body.as_bytes()))
        .content_type("multipart/form-data; boundary=XB")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let id = file_id(&body["file"]);
    assert_eq!(body["file"]["originalName"], "a.txt");
    assert_eq!(stored_names(&dir), vec![id.clone()]);

    let response = server.get(&format!("/api/download/{}", id)).await;
    assert_eq!(response.as_bytes().as_ref(), b"hello");
}

// ============================================================================
// List / Info Tests
// ============================================================================

#[tokio::test]
async fn test_list_empty() {
    let (server, _dir) = create_test_server();

    let response = server.get("/api/files").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_includes_uploaded_size() {
    let (server, _dir) = create_test_server();

    let content = vec![7u8; 4096];
    let file = upload(&server, &content, "blob.dat").await;
    let id = file_id(&file);

    let body: Value = server.get("/api/files").await.json();
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["filename"], id.as_str());
    assert_eq!(entry["size"], 4096);
    assert_eq!(entry["downloadUrl"], format!("/api/download/{}", id));
    assert_eq!(entry["viewUrl"], format!("/api/view/{}", id));
    assert!(entry["uploadDate"].is_string());
}

#[tokio::test]
async fn test_list_storage_unavailable() {
    let (server, dir) = create_test_server();
    std::fs::remove_dir_all(dir.path()).unwrap();

    let response = server.get("/api/files").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_info_success() {
    let (server, _dir) = create_test_server();
    let id = file_id(&upload(&server, b"12345", "five.txt").await);

    let response = server.get(&format!("/api/files/{}/info", id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["size"], 5);
    assert_eq!(body["viewUrl"], format!("/api/view/{}", id));
}

// ============================================================================
// Download / View Tests
// ============================================================================

#[tokio::test]
async fn test_download_roundtrip_binary() {
    let (server, _dir) = create_test_server();
    let content: Vec<u8> = (0..=255).cycle().take(10_000).collect();

    let response = server
        .post("/api/upload")
        .multipart(file_form(&content, "bytes.bin", "application/octet-stream"))
        .await;
    let id = file_id(&response.json::<Value>()["file"]);

    let response = server.get(&format!("/api/download/{}", id)).await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), content.as_slice());
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        format!("attachment; filename=\"{}\"", id).as_str()
    );
}

#[tokio::test]
async fn test_view_is_inline() {
    let (server, _dir) = create_test_server();
    let id = file_id(&upload(&server, b"<svg/>", "icon.svg").await);

    let response = server.get(&format!("/api/view/{}", id)).await;

    response.assert_status_ok();
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    assert_eq!(response.header(header::CONTENT_TYPE), "image/svg+xml");
    assert_eq!(response.as_bytes().as_ref(), b"<svg/>");
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_delete_success() {
    let (server, dir) = create_test_server();
    let id = file_id(&upload(&server, b"bye", "bye.txt").await);

    let response = server.delete(&format!("/api/files/{}", id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
    assert!(stored_names(&dir).is_empty());

    for path in [
        format!("/api/files/{}/info", id),
        format!("/api/download/{}", id),
        format!("/api/view/{}", id),
    ] {
        server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
    }
    server
        .delete(&format!("/api/files/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Not Found / Invalid Identifier Tests
// ============================================================================

#[tokio::test]
async fn test_nonexistent_file_returns_404() {
    let (server, _dir) = create_test_server();
    let missing = "1700000000000-123456789.txt";

    let responses = [
        server.get(&format!("/api/download/{}", missing)).await,
        server.get(&format!("/api/view/{}", missing)).await,
        server.get(&format!("/api/files/{}/info", missing)).await,
        server.delete(&format!("/api/files/{}", missing)).await,
    ];

    for response in responses {
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "File not found");
    }
}

#[tokio::test]
async fn test_path_traversal_rejected() {
    let (server, dir) = create_test_server();
    let secret = dir.path().parent().unwrap().join("filebox-secret.txt");
    let _ = std::fs::write(&secret, b"secret");

    for id in [
        "..%2Ffilebox-secret.txt",
        "%2Fetc%2Fpasswd",
        "..%5Cfilebox-secret.txt",
        ".incoming",
    ] {
        let response = server.get(&format!("/api/download/{}", id)).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid file identifier");

        server
            .delete(&format!("/api/files/{}", id))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let _ = std::fs::remove_file(&secret);
}
