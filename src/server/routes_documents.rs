//! Document API routes.
//!
//! CRUD endpoints for documents written with the editor. Bodies are stored
//! as editor HTML; embedded images are referenced by `data-image-id`
//! markers inside that HTML.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use inkpad_common::DocumentId;
use inkpad_db::models::Document;
use inkpad_db::queries::documents::{self, NewDocument};
use serde::{Deserialize, Serialize};

use super::AppContext;

/// Create document routes.
pub fn document_routes() -> Router<AppContext> {
    Router::new()
        .route("/documents", get(list_documents).post(create_document))
        .route(
            "/documents/:document_id",
            get(get_document)
                .put(update_document)
                .delete(delete_document),
        )
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Request to create or update a document.
#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub title: String,
    /// Editor HTML
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Document information.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            body: doc.body,
            author: doc.author,
            published: doc.published,
            created_at: doc.created_at.to_rfc3339(),
            updated_at: doc.updated_at.to_rfc3339(),
        }
    }
}

impl DocumentRequest {
    fn as_new_document(&self) -> NewDocument<'_> {
        NewDocument {
            title: &self.title,
            body: &self.body,
            author: self.author.as_deref(),
            published: self.published,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List all documents, newest first.
async fn list_documents(State(ctx): State<AppContext>) -> impl IntoResponse {
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

    match documents::list_documents(&conn) {
        Ok(docs) => Json(
            docs.into_iter()
                .map(DocumentResponse::from)
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

/// Create a new document.
async fn create_document(
    State(ctx): State<AppContext>,
    Json(payload): Json<DocumentRequest>,
) -> impl IntoResponse {
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

    match documents::insert_document(&conn, &payload.as_new_document()) {
        Ok(doc) => (StatusCode::CREATED, Json(DocumentResponse::from(doc))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Get a document by ID.
async fn get_document(
    State(ctx): State<AppContext>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_document_id(&document_id) else {
        return invalid_id_response();
    };

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

    match documents::get_document(&conn, id) {
        Ok(Some(doc)) => Json(DocumentResponse::from(doc)).into_response(),
        Ok(None) => not_found_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Update an existing document.
async fn update_document(
    State(ctx): State<AppContext>,
    Path(document_id): Path<String>,
    Json(payload): Json<DocumentRequest>,
) -> impl IntoResponse {
    let Some(id) = parse_document_id(&document_id) else {
        return invalid_id_response();
    };

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

    match documents::update_document(&conn, id, &payload.as_new_document()) {
        Ok(true) => match documents::get_document(&conn, id) {
            Ok(Some(doc)) => Json(DocumentResponse::from(doc)).into_response(),
            Ok(None) => not_found_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response(),
        },
        Ok(false) => not_found_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Delete a document by ID.
async fn delete_document(
    State(ctx): State<AppContext>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_document_id(&document_id) else {
        return invalid_id_response();
    };

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

    match documents::delete_document(&conn, id) {
        Ok(true) => Json(serde_json::json!({"success": true})).into_response(),
        Ok(false) => not_found_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_document_id(raw: &str) -> Option<DocumentId> {
    raw.parse::<i64>().ok().map(DocumentId::from)
}

fn invalid_id_response() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": "Invalid document ID"})),
    )
        .into_response()
}

fn not_found_response() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Document not found"})),
    )
        .into_response()
}
