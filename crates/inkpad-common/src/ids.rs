//! Typed ID wrappers for type safety across inkpad.
//!
//! This module provides newtype wrappers around database row ids to prevent
//! mixing different kinds of identifiers (e.g., using a DocumentId where an
//! ImageId is expected). Ids are assigned by SQLite AUTOINCREMENT columns, so
//! they are unique and monotonically increasing.

use serde::{Deserialize, Serialize};

/// Unique identifier for an uploaded editor image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ImageId(i64);

impl ImageId {
    /// Returns the raw database id.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for ImageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ImageId> for i64 {
    fn from(id: ImageId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(i64);

impl DocumentId {
    /// Returns the raw database id.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for DocumentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<DocumentId> for i64 {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_id_round_trip() {
        let id = ImageId::from(7);
        let raw: i64 = id.into();
        assert_eq!(raw, 7);
        assert_eq!(id.as_i64(), 7);
    }

    #[test]
    fn test_image_id_serialization() {
        let id = ImageId::from(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let deserialized: ImageId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_image_id_ordering() {
        let mut ids = vec![ImageId::from(3), ImageId::from(1), ImageId::from(2)];
        ids.sort();
        assert_eq!(ids, vec![ImageId::from(1), ImageId::from(2), ImageId::from(3)]);
    }

    #[test]
    fn test_document_id_display() {
        let id = DocumentId::from(99);
        assert_eq!(format!("{}", id), "99");
    }

    #[test]
    fn test_image_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ImageId::from(5));
        assert!(set.contains(&ImageId::from(5)));
        assert!(!set.contains(&ImageId::from(6)));
    }

    #[test]
    fn test_different_id_types() {
        let _image_id = ImageId::from(1);
        let _document_id = DocumentId::from(1);
        // Type system prevents mixing these at compile time
    }
}
