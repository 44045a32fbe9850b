//! Content catalog: the registry of content-bearing record types.
//!
//! The cleanup scan must see every attribute that can embed image markers.
//! Sources declare their scannable attributes up front and are registered
//! into a [`ContentCatalog`] that the scanner receives as a parameter; there
//! is no implicit global registry. [`TableSource`] is the SQLite-backed
//! implementation used for inkpad's own `documents` table; host applications
//! embedding inkpad register additional sources the same way.

use inkpad_common::{Error, Result};
use inkpad_db::pool::{get_conn, DbPool};

/// Classification of a declared attribute.
///
/// Only `Text` attributes (free-form string content) are scanned for image
/// markers; structured attributes cannot hold them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Text,
    Other,
}

/// A declared attribute of a content source.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    pub name: String,
    pub kind: AttributeKind,
}

impl AttributeDef {
    /// Declare a free-form text attribute.
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::Text,
        }
    }

    /// Declare a structured (non-text) attribute.
    pub fn other(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AttributeKind::Other,
        }
    }
}

/// One registered content-bearing record type.
pub trait ContentSource {
    /// Stable name used in reports and warnings.
    fn name(&self) -> &str;

    /// Declared attributes with their text/non-text classification.
    fn attributes(&self) -> Vec<AttributeDef>;

    /// Read the named attribute from every instance.
    ///
    /// The outer error means the backing store could not be read at all for
    /// this attribute. Each inner element is one instance's extracted value,
    /// or that instance's extraction failure. Instances with no value for
    /// the attribute are omitted.
    fn attribute_values(&self, attribute: &str) -> Result<Vec<Result<String>>>;
}

/// Ordered collection of registered content sources.
#[derive(Default)]
pub struct ContentCatalog {
    sources: Vec<Box<dyn ContentSource>>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content source. Scan order follows registration order.
    pub fn register(&mut self, source: Box<dyn ContentSource>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Box<dyn ContentSource>] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// A [`ContentSource`] backed by one SQLite table with declared columns.
pub struct TableSource {
    pool: DbPool,
    table: String,
    attributes: Vec<AttributeDef>,
}

impl TableSource {
    pub fn new(pool: DbPool, table: &str, attributes: Vec<AttributeDef>) -> Self {
        Self {
            pool,
            table: table.to_string(),
            attributes,
        }
    }
}

impl ContentSource for TableSource {
    fn name(&self) -> &str {
        &self.table
    }

    fn attributes(&self) -> Vec<AttributeDef> {
        self.attributes.clone()
    }

    fn attribute_values(&self, attribute: &str) -> Result<Vec<Result<String>>> {
        // Only declared attributes may be interpolated into SQL.
        if !self.attributes.iter().any(|a| a.name == attribute) {
            return Err(Error::invalid_input(format!(
                "attribute {} is not declared for {}",
                attribute, self.table
            )));
        }

        let conn = get_conn(&self.pool)?;
        let sql = format!("SELECT \"{}\" FROM \"{}\"", attribute, self.table);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::database(e.to_string()))?;
        let mut rows = stmt.query([]).map_err(|e| Error::database(e.to_string()))?;

        let mut values = Vec::new();
        while let Some(row) = rows.next().map_err(|e| Error::database(e.to_string()))? {
            match row.get::<_, Option<String>>(0) {
                Ok(Some(value)) if !value.is_empty() => values.push(Ok(value)),
                Ok(_) => {}
                Err(e) => values.push(Err(Error::database(e.to_string()))),
            }
        }

        Ok(values)
    }
}

/// The catalog of inkpad's own content tables.
///
/// Host applications with additional content-bearing tables start from this
/// and register their own sources on top.
pub fn default_catalog(pool: DbPool) -> ContentCatalog {
    let mut catalog = ContentCatalog::new();
    catalog.register(Box::new(TableSource::new(
        pool,
        "documents",
        vec![
            AttributeDef::text("title"),
            AttributeDef::text("body"),
            AttributeDef::text("author"),
            AttributeDef::other("published"),
            AttributeDef::other("created_at"),
            AttributeDef::other("updated_at"),
        ],
    )));
    catalog
}
