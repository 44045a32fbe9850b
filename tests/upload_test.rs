//! Integration tests for the editor image upload endpoint.

mod common;

use common::{png_bytes, TestHarness};
use inkpad::config::Config;

fn multipart_image(data: Vec<u8>, content_type: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(data)
        .file_name("test.png")
        .mime_str(content_type)
        .unwrap();
    reqwest::multipart::Form::new().part("image", part)
}

#[tokio::test]
async fn upload_image_success() {
    let (h, addr) = TestHarness::with_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/editor/upload"))
        .multipart(multipart_image(png_bytes(), "image/png"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(
        body["url"].as_str().unwrap(),
        format!("/api/editor/images/{}", id)
    );

    // The record exists and its file landed in the upload dir
    let conn = h.conn();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let path: String = conn
        .query_row("SELECT path FROM images", [], |row| row.get(0))
        .unwrap();
    assert!(h.storage().abs_path(&path).exists());
}

#[tokio::test]
async fn upload_ids_are_monotonic() {
    let (_h, addr) = TestHarness::with_server().await;

    let client = reqwest::Client::new();
    let mut last_id = 0;
    for _ in 0..3 {
        let resp = client
            .post(format!("http://{addr}/api/editor/upload"))
            .multipart(multipart_image(png_bytes(), "image/png"))
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = resp.json().await.unwrap();
        let id = body["id"].as_i64().unwrap();
        assert!(id > last_id);
        last_id = id;
    }
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let (h, addr) = TestHarness::with_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/editor/upload"))
        .multipart(reqwest::multipart::Form::new().text("note", "no file here"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    let conn = h.conn();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn upload_rejects_non_image_content_type() {
    let (_h, addr) = TestHarness::with_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/editor/upload"))
        .multipart(multipart_image(b"plain text".to_vec(), "text/plain"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Unsupported content type"));
}

#[tokio::test]
async fn upload_rejects_bytes_that_are_not_an_image() {
    // Declared type lies; the payload does not decode as an image.
    let (_h, addr) = TestHarness::with_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/editor/upload"))
        .multipart(multipart_image(b"not an image at all".to_vec(), "image/png"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn upload_get_method_not_allowed() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/editor/upload"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn upload_requires_auth_when_enabled() {
    let mut config = Config::default();
    config.server.auth.enabled = true;
    config.server.auth.api_key = Some("test-key".to_string());

    let (_h, addr) = TestHarness::with_server_config(config).await;

    let client = reqwest::Client::new();

    // No credentials
    let resp = client
        .post(format!("http://{addr}/api/editor/upload"))
        .multipart(multipart_image(png_bytes(), "image/png"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Valid API key
    let resp = client
        .post(format!("http://{addr}/api/editor/upload"))
        .bearer_auth("test-key")
        .multipart(multipart_image(png_bytes(), "image/png"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // API key callers have no session username
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn upload_respects_body_limit() {
    let mut config = Config::default();
    config.storage.max_upload_bytes = 64;

    let (_h, addr) = TestHarness::with_server_config(config).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/api/editor/upload"))
        .multipart(multipart_image(vec![0u8; 4096], "image/png"))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}
