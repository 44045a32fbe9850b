//! Integration tests for image serving, listing, and deletion routes.

mod common;

use common::{png_bytes, TestHarness};

#[tokio::test]
async fn serve_image_returns_png() {
    let (h, addr) = TestHarness::with_server().await;

    let image = h.ctx.images.store_upload(&png_bytes(), None).unwrap();

    let resp = reqwest::get(format!("http://{addr}/api/editor/images/{}", image.id))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap(),
        "image/png"
    );
    assert!(resp
        .headers()
        .get("cache-control")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("immutable"));

    let body = resp.bytes().await.unwrap();
    assert!(body.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn serve_image_not_found() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/editor/images/999"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn serve_image_invalid_id() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/editor/images/not-a-number"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn serve_image_missing_file_on_disk() {
    let (h, addr) = TestHarness::with_server().await;

    let image = h.ctx.images.store_upload(&png_bytes(), None).unwrap();
    std::fs::remove_file(h.storage().abs_path(&image.path)).unwrap();

    let resp = reqwest::get(format!("http://{addr}/api/editor/images/{}", image.id))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn list_images_newest_first() {
    let (h, addr) = TestHarness::with_server().await;

    let first = h.ctx.images.store_upload(&png_bytes(), None).unwrap();
    let second = h.ctx.images.store_upload(&png_bytes(), None).unwrap();

    let resp = reqwest::get(format!("http://{addr}/api/editor/images"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"].as_i64().unwrap(), second.id.as_i64());
    assert_eq!(list[1]["id"].as_i64().unwrap(), first.id.as_i64());
}

#[tokio::test]
async fn delete_image_removes_record_and_file() {
    let (h, addr) = TestHarness::with_server().await;

    let image = h.ctx.images.store_upload(&png_bytes(), None).unwrap();
    let file_path = h.storage().abs_path(&image.path);
    assert!(file_path.exists());

    let client = reqwest::Client::new();
    let resp = client
        .delete(format!("http://{addr}/api/editor/images/{}", image.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(!file_path.exists());

    // Deleting again is a 404, not an error
    let resp = client
        .delete(format!("http://{addr}/api/editor/images/{}", image.id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn health_check_is_public() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}
