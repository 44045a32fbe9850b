//! Internal Rust models matching the database schema.
//!
//! This module provides strongly-typed Rust structures that map to database
//! tables. All models use id types from inkpad-common.

use chrono::{DateTime, Utc};
use inkpad_common::{DocumentId, ImageId};
use serde::{Deserialize, Serialize};

/// An uploaded editor image.
///
/// `path` is the storage-relative locator of the file on disk (e.g.
/// `editor_uploads/3f2a….png`). Records are created by the upload endpoint
/// and removed either explicitly or by the cleanup scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorImage {
    pub id: ImageId,
    pub path: String,
    pub uploaded_by: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// A document written with the editor.
///
/// The body holds editor HTML; embedded images are referenced by
/// `data-image-id` markers rather than foreign keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
