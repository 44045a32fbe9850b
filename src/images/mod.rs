//! Image upload storage and management module.
//!
//! This module provides local filesystem storage for editor uploads and the
//! service coordinating validation, file writes, and database records from
//! `inkpad_db`.

mod service;
mod storage;

pub use service::ImageService;
pub use storage::ImageStorage;
