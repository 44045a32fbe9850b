//! Document database queries.
//!
//! Documents are the built-in content-bearing records: their bodies hold
//! editor HTML which may embed `data-image-id` markers.

use chrono::{DateTime, Utc};
use inkpad_common::{DocumentId, Error, Result};
use rusqlite::Connection;

use crate::models::Document;

/// Fields accepted when creating or updating a document.
#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub author: Option<&'a str>,
    pub published: bool,
}

/// Parse a document from a database row.
///
/// Expects columns in order: id, title, body, author, published, created_at,
/// updated_at.
fn parse_document_row(row: &rusqlite::Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: DocumentId::from(row.get::<_, i64>(0)?),
        title: row.get(1)?,
        body: row.get(2)?,
        author: row.get(3)?,
        published: row.get::<_, i32>(4)? != 0,
        created_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(5)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        updated_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(6)?)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Insert a new document and return it with its assigned id.
pub fn insert_document(conn: &Connection, doc: &NewDocument) -> Result<Document> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO documents (title, body, author, published, created_at, updated_at)
         VALUES (:title, :body, :author, :published, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":title": doc.title,
            ":body": doc.body,
            ":author": doc.author,
            ":published": doc.published as i32,
            ":created_at": now.to_rfc3339(),
            ":updated_at": now.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Document {
        id: DocumentId::from(conn.last_insert_rowid()),
        title: doc.title.to_string(),
        body: doc.body.to_string(),
        author: doc.author.map(str::to_string),
        published: doc.published,
        created_at: now,
        updated_at: now,
    })
}

/// Get a document by ID.
pub fn get_document(conn: &Connection, id: DocumentId) -> Result<Option<Document>> {
    let result = conn.query_row(
        "SELECT id, title, body, author, published, created_at, updated_at
         FROM documents WHERE id = :id",
        rusqlite::named_params! { ":id": id.as_i64() },
        parse_document_row,
    );

    match result {
        Ok(doc) => Ok(Some(doc)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all documents, newest first.
pub fn list_documents(conn: &Connection) -> Result<Vec<Document>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, body, author, published, created_at, updated_at
             FROM documents
             ORDER BY created_at DESC, id DESC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let docs = stmt
        .query_map([], parse_document_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(docs)
}

/// Update a document's editable fields.
///
/// # Returns
///
/// * `Ok(true)` - If the document was updated
/// * `Ok(false)` - If the document did not exist
pub fn update_document(conn: &Connection, id: DocumentId, doc: &NewDocument) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "UPDATE documents
             SET title = :title, body = :body, author = :author,
                 published = :published, updated_at = :updated_at
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": id.as_i64(),
                ":title": doc.title,
                ":body": doc.body,
                ":author": doc.author,
                ":published": doc.published as i32,
                ":updated_at": Utc::now().to_rfc3339(),
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

/// Delete a document by ID.
///
/// # Returns
///
/// * `Ok(true)` - If the document was deleted
/// * `Ok(false)` - If the document did not exist
pub fn delete_document(conn: &Connection, id: DocumentId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM documents WHERE id = :id",
            rusqlite::named_params! { ":id": id.as_i64() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}
