//! Orphaned-image cleanup.
//!
//! Computes the set of uploaded images referenced by no registered content
//! source and deletes it, or just reports it in dry-run mode. An image is
//! referenced when any text attribute of any registered source contains a
//! `data-image-id="<id>"` marker naming it.
//!
//! Individual extraction or deletion failures degrade to warnings so one bad
//! record cannot block cleanup of the rest; the only fatal condition is an
//! unreachable image store or catalog backing store.

use std::collections::HashSet;
use std::sync::OnceLock;

use inkpad_common::{ImageId, Result};
use inkpad_db::models::EditorImage;
use inkpad_db::pool::{get_conn, DbPool};
use inkpad_db::queries::images;
use regex::Regex;
use serde::Serialize;

use crate::catalog::{AttributeKind, ContentCatalog};
use crate::images::ImageStorage;

/// Store of uploaded images the scan runs against.
///
/// File and record deletion are independently failable and idempotent:
/// deleting something already gone reports `Ok(false)` rather than failing,
/// so overlapping cleanup runs tolerate each other.
pub trait ImageStore {
    /// Enumerate every image record.
    fn list_all(&self) -> Result<Vec<EditorImage>>;

    /// Delete the stored file behind an image. `Ok(false)` if already gone.
    fn delete_file(&self, image: &EditorImage) -> Result<bool>;

    /// Delete the database record. `Ok(false)` if already gone.
    fn delete_record(&self, id: ImageId) -> Result<bool>;
}

/// Production [`ImageStore`] backed by the database and filesystem storage.
pub struct DbImageStore {
    pool: DbPool,
    storage: ImageStorage,
}

impl DbImageStore {
    pub fn new(pool: DbPool, storage: ImageStorage) -> Self {
        Self { pool, storage }
    }
}

impl ImageStore for DbImageStore {
    fn list_all(&self) -> Result<Vec<EditorImage>> {
        let conn = get_conn(&self.pool)?;
        images::list_images(&conn)
    }

    fn delete_file(&self, image: &EditorImage) -> Result<bool> {
        self.storage.delete(&image.path)
    }

    fn delete_record(&self, id: ImageId) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        images::delete_image(&conn, id)
    }
}

/// Outcome of a cleanup scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Number of image records at the start of the scan.
    pub total_images: u64,
    /// Content sources that owned at least one text attribute.
    pub sources_checked: usize,
    /// Distinct image ids referenced by at least one marker.
    pub used_count: usize,
    /// Images referenced by nothing.
    pub unused_count: usize,
    /// Whether this scan ran without mutating anything.
    pub dry_run: bool,
    /// Unused images in ascending id order: what was (or, in dry-run mode,
    /// would be) deleted.
    pub unused_images: Vec<EditorImage>,
    /// Ids whose records were removed, ascending.
    pub deleted_ids: Vec<ImageId>,
    /// Non-fatal problems encountered, in the order they occurred.
    pub warnings: Vec<String>,
}

impl ScanReport {
    fn new(total_images: u64, dry_run: bool) -> Self {
        Self {
            total_images,
            sources_checked: 0,
            used_count: 0,
            unused_count: 0,
            dry_run,
            unused_images: Vec::new(),
            deleted_ids: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

static MARKER: OnceLock<Regex> = OnceLock::new();

/// The marker pattern embedded in editor HTML: `data-image-id="<digits>"`.
fn marker_regex() -> &'static Regex {
    MARKER.get_or_init(|| Regex::new(r#"data-image-id="(\d+)""#).expect("valid marker regex"))
}

/// Collect every image id referenced by markers in a block of content.
///
/// Duplicates collapse into the set. Digit runs too large for an `i64`
/// cannot name a real image and are skipped.
pub fn extract_image_ids(content: &str, used: &mut HashSet<ImageId>) {
    for caps in marker_regex().captures_iter(content) {
        if let Ok(id) = caps[1].parse::<i64>() {
            used.insert(ImageId::from(id));
        }
    }
}

/// Run the reachability scan over the image store and content catalog.
///
/// Walks every text attribute of every registered source, collects the set
/// of referenced image ids, and deletes (or reports, when `dry_run` is set)
/// the images referenced by nothing. Extraction and deletion failures are
/// accumulated as warnings; only an unreachable image store aborts the scan.
pub fn scan(
    store: &dyn ImageStore,
    catalog: &ContentCatalog,
    dry_run: bool,
) -> Result<ScanReport> {
    let all_images = store.list_all()?;
    let mut report = ScanReport::new(all_images.len() as u64, dry_run);

    let mut used: HashSet<ImageId> = HashSet::new();
    for source in catalog.sources() {
        let text_attrs: Vec<_> = source
            .attributes()
            .into_iter()
            .filter(|a| a.kind == AttributeKind::Text)
            .collect();

        // A source with no text attributes cannot hold a marker.
        if text_attrs.is_empty() {
            continue;
        }

        report.sources_checked += 1;
        tracing::debug!("Checking {}", source.name());

        for attr in &text_attrs {
            let values = match source.attribute_values(&attr.name) {
                Ok(values) => values,
                Err(e) => {
                    report.warnings.push(format!(
                        "Error checking {}.{}: {}",
                        source.name(),
                        attr.name,
                        e
                    ));
                    continue;
                }
            };

            for value in values {
                match value {
                    Ok(content) => extract_image_ids(&content, &mut used),
                    Err(e) => report.warnings.push(format!(
                        "Error reading {}.{} on one record: {}",
                        source.name(),
                        attr.name,
                        e
                    )),
                }
            }
        }
    }

    report.used_count = used.len();

    let mut unused: Vec<EditorImage> = all_images
        .into_iter()
        .filter(|image| !used.contains(&image.id))
        .collect();
    unused.sort_by_key(|image| image.id);
    report.unused_count = unused.len();

    if unused.is_empty() || dry_run {
        report.unused_images = unused;
        return Ok(report);
    }

    for image in &unused {
        match store.delete_file(image) {
            Ok(true) => {}
            Ok(false) => report.warnings.push(format!(
                "File already gone for image {}: {}",
                image.id, image.path
            )),
            Err(e) => report.warnings.push(format!(
                "Failed to delete file for image {}: {}",
                image.id, e
            )),
        }

        // The record goes regardless of what happened to the file.
        match store.delete_record(image.id) {
            Ok(true) => report.deleted_ids.push(image.id),
            Ok(false) => report
                .warnings
                .push(format!("Record already deleted for image {}", image.id)),
            Err(e) => report.warnings.push(format!(
                "Failed to delete record for image {}: {}",
                image.id, e
            )),
        }
    }

    report.unused_images = unused;
    Ok(report)
}
