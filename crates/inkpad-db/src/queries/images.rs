//! Uploaded-image database queries.
//!
//! This module provides CRUD operations for editor image records: insert,
//! get, list, count, and delete.

use chrono::{DateTime, Utc};
use inkpad_common::{Error, ImageId, Result};
use rusqlite::Connection;

use crate::models::EditorImage;

/// Parse an image from a database row.
///
/// Expects columns in order: id, path, uploaded_by, uploaded_at.
fn parse_image_row(row: &rusqlite::Row) -> rusqlite::Result<EditorImage> {
    Ok(EditorImage {
        id: ImageId::from(row.get::<_, i64>(0)?),
        path: row.get(1)?,
        uploaded_by: row.get(2)?,
        uploaded_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(3)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Insert a new image record and return it with its assigned id.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `path` - Storage-relative locator of the stored file
/// * `uploaded_by` - Username of the uploader, if known
pub fn insert_image(
    conn: &Connection,
    path: &str,
    uploaded_by: Option<&str>,
) -> Result<EditorImage> {
    let uploaded_at = Utc::now();

    conn.execute(
        "INSERT INTO images (path, uploaded_by, uploaded_at)
         VALUES (:path, :uploaded_by, :uploaded_at)",
        rusqlite::named_params! {
            ":path": path,
            ":uploaded_by": uploaded_by,
            ":uploaded_at": uploaded_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(EditorImage {
        id: ImageId::from(conn.last_insert_rowid()),
        path: path.to_string(),
        uploaded_by: uploaded_by.map(str::to_string),
        uploaded_at,
    })
}

/// Get an image by ID.
///
/// # Returns
///
/// * `Ok(Some(EditorImage))` - The image if found
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<EditorImage>> {
    let result = conn.query_row(
        "SELECT id, path, uploaded_by, uploaded_at FROM images WHERE id = :id",
        rusqlite::named_params! { ":id": id.as_i64() },
        parse_image_row,
    );

    match result {
        Ok(image) => Ok(Some(image)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all image records, newest upload first.
///
/// Ties on the timestamp fall back to descending id so the order is stable.
pub fn list_images(conn: &Connection) -> Result<Vec<EditorImage>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, path, uploaded_by, uploaded_at
             FROM images
             ORDER BY uploaded_at DESC, id DESC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let images = stmt
        .query_map([], parse_image_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(images)
}

/// Count all image records.
pub fn count_images(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(count as u64)
}

/// Delete an image record by ID.
///
/// # Returns
///
/// * `Ok(true)` - If the record was deleted
/// * `Ok(false)` - If the record did not exist
/// * `Err(Error)` - If a database error occurs
pub fn delete_image(conn: &Connection, id: ImageId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM images WHERE id = :id",
            rusqlite::named_params! { ":id": id.as_i64() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}
