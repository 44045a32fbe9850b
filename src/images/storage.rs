//! Filesystem-level storage for uploaded editor images.
//!
//! Files live under `{base_dir}/editor_uploads/` with random unique names;
//! the storage-relative path is the locator recorded in the database.

use std::path::PathBuf;

use inkpad_common::{Error, Result};
use uuid::Uuid;

/// Subdirectory of the data dir where uploads land.
const UPLOAD_SUBDIR: &str = "editor_uploads";

/// Filesystem manager for uploaded image files.
pub struct ImageStorage {
    base_dir: PathBuf,
}

impl ImageStorage {
    /// Create a new `ImageStorage` rooted at the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Write upload bytes to a new uniquely-named file.
    ///
    /// The upload directory is created on demand. Returns the
    /// storage-relative locator, e.g. `editor_uploads/{uuid}.png`.
    pub fn write(&self, extension: &str, data: &[u8]) -> Result<String> {
        let dir = self.base_dir.join(UPLOAD_SUBDIR);
        std::fs::create_dir_all(&dir)?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        std::fs::write(dir.join(&filename), data)?;

        Ok(format!("{}/{}", UPLOAD_SUBDIR, filename))
    }

    /// Absolute filesystem path for a stored locator.
    pub fn abs_path(&self, locator: &str) -> PathBuf {
        self.base_dir.join(locator)
    }

    /// Delete the file behind a locator.
    ///
    /// Returns `Ok(false)` when the file was already gone, so racing
    /// cleanup runs degrade to a no-op instead of an error.
    pub fn delete(&self, locator: &str) -> Result<bool> {
        match std::fs::remove_file(self.abs_path(locator)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
