//! Image service coordinating storage and database operations.
//!
//! Provides high-level operations for validating and storing uploads with
//! automatic database record creation, resolving records for serving, and
//! deleting both file and record.

use std::path::PathBuf;

use inkpad_common::{Error, ImageId, Result};
use inkpad_db::models::EditorImage;
use inkpad_db::pool::{get_conn, DbPool};
use inkpad_db::queries::images;

use super::storage::ImageStorage;

/// High-level image service that coordinates filesystem storage with database records.
pub struct ImageService {
    storage: ImageStorage,
    pool: DbPool,
}

impl ImageService {
    /// Create a new `ImageService`.
    pub fn new(storage: ImageStorage, pool: DbPool) -> Self {
        Self { storage, pool }
    }

    /// Validate upload bytes, store them to disk, and create a database record.
    ///
    /// The bytes must decode as a recognized image format; anything else is
    /// rejected with `Error::InvalidInput` before touching disk.
    ///
    /// # Arguments
    ///
    /// * `data` - Raw upload bytes
    /// * `uploaded_by` - Username of the uploader, if known
    pub fn store_upload(&self, data: &[u8], uploaded_by: Option<&str>) -> Result<EditorImage> {
        let format = image::guess_format(data)
            .map_err(|_| Error::invalid_input("File is not a valid image"))?;
        let extension = format.extensions_str().first().copied().unwrap_or("bin");

        let locator = self.storage.write(extension, data)?;

        let conn = get_conn(&self.pool)?;
        images::insert_image(&conn, &locator, uploaded_by)
    }

    /// Resolve an image id to its absolute file path and MIME type.
    pub fn open(&self, id: ImageId) -> Result<(PathBuf, &'static str)> {
        let conn = get_conn(&self.pool)?;
        let image = images::get_image(&conn, id)?
            .ok_or_else(|| Error::not_found(format!("image {}", id)))?;

        Ok((self.storage.abs_path(&image.path), content_type_for(&image.path)))
    }

    /// Delete an image's stored file and database record.
    ///
    /// A file that cannot be removed is logged and does not block the record
    /// delete. Returns `Ok(false)` when no record existed.
    pub fn delete_image(&self, id: ImageId) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let Some(image) = images::get_image(&conn, id)? else {
            return Ok(false);
        };

        if let Err(e) = self.storage.delete(&image.path) {
            tracing::warn!("Failed to delete file {} for image {}: {}", image.path, id, e);
        }

        images::delete_image(&conn, id)
    }

    /// The underlying filesystem storage.
    pub fn storage(&self) -> &ImageStorage {
        &self.storage
    }
}

/// MIME type for a stored locator, derived from its file extension.
fn content_type_for(locator: &str) -> &'static str {
    std::path::Path::new(locator)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(image::ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}
