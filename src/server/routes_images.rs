//! Editor image upload and serving routes.
//!
//! Provides the multipart upload endpoint the editor posts to, plus
//! endpoints for serving, listing, and deleting stored images.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use inkpad_common::{Error, ImageId};
use inkpad_db::models::EditorImage;
use inkpad_db::queries::images;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use super::auth::session_username;
use super::AppContext;

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/editor/upload", post(upload_image))
        .route("/editor/images", get(list_images))
        .route(
            "/editor/images/:image_id",
            get(serve_image).delete(delete_image),
        )
}

// ============================================================================
// Response types
// ============================================================================

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub id: ImageId,
    pub url: String,
}

/// One stored image in a listing.
#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: ImageId,
    pub url: String,
    pub path: String,
    pub uploaded_by: Option<String>,
    pub uploaded_at: String,
}

impl From<EditorImage> for ImageResponse {
    fn from(image: EditorImage) -> Self {
        Self {
            id: image.id,
            url: image_url(image.id),
            path: image.path,
            uploaded_by: image.uploaded_by,
            uploaded_at: image.uploaded_at.to_rfc3339(),
        }
    }
}

/// Retrieval URL for a stored image.
fn image_url(id: ImageId) -> String {
    format!("/api/editor/images/{}", id)
}

// ============================================================================
// Handlers
// ============================================================================

/// Accept a multipart image upload from the editor.
///
/// Expects exactly one file field named `image`. Missing files and non-image
/// uploads are client errors; on success the response carries the new record
/// id and its retrieval URL.
async fn upload_image(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let uploaded_by = session_username(&ctx.config.server.auth, &jar);

    let mut data = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("image") {
                    continue;
                }

                // Reject obviously wrong declared types before reading the body
                if let Some(content_type) = field.content_type() {
                    if !content_type.starts_with("image/") {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(serde_json::json!({
                                "error": format!("Unsupported content type: {}", content_type)
                            })),
                        )
                            .into_response();
                    }
                }

                match field.bytes().await {
                    Ok(bytes) => {
                        data = Some(bytes);
                        break;
                    }
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(serde_json::json!({
                                "error": format!("Failed to read upload: {}", e)
                            })),
                        )
                            .into_response()
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("Invalid multipart request: {}", e)
                    })),
                )
                    .into_response()
            }
        }
    }

    let Some(data) = data else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "No image file provided"})),
        )
            .into_response();
    };

    match ctx.images.store_upload(&data, uploaded_by.as_deref()) {
        Ok(image) => (
            StatusCode::OK,
            Json(UploadResponse {
                success: true,
                id: image.id,
                url: image_url(image.id),
            }),
        )
            .into_response(),
        Err(Error::InvalidInput(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Serve a stored image file by ID.
///
/// Returns the image bytes with its content type and caching headers.
async fn serve_image(
    State(ctx): State<AppContext>,
    Path(image_id): Path<String>,
) -> impl IntoResponse {
    let id = match image_id.parse::<i64>() {
        Ok(id) => ImageId::from(id),
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid image ID"})),
            )
                .into_response()
        }
    };

    let (path, content_type) = match ctx.images.open(id) {
        Ok(resolved) => resolved,
        Err(Error::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Image not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    // Open the file and stream it back
    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Image file not found on disk"})),
            )
                .into_response()
        }
    };

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    (
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
            (header::CONTENT_TYPE, content_type),
        ],
        body,
    )
        .into_response()
}

/// List all stored images, newest upload first.
async fn list_images(State(ctx): State<AppContext>) -> impl IntoResponse {
    let conn = match ctx.db_pool.get() {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match images::list_images(&conn) {
        Ok(image_list) => Json(
            image_list
                .into_iter()
                .map(ImageResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Delete a stored image (record and file).
async fn delete_image(
    State(ctx): State<AppContext>,
    Path(image_id): Path<String>,
) -> impl IntoResponse {
    let id = match image_id.parse::<i64>() {
        Ok(id) => ImageId::from(id),
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid image ID"})),
            )
                .into_response()
        }
    };

    match ctx.images.delete_image(id) {
        Ok(true) => Json(serde_json::json!({"success": true})).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Image not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
