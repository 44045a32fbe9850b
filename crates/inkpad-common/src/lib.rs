//! Inkpad-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across inkpad:
//!
//! - **Typed IDs**: Type-safe integer wrappers for images and documents
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use inkpad_common::{ImageId, Error, Result};
//!
//! let image_id = ImageId::from(42);
//! assert_eq!(image_id.to_string(), "42");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("image"))
//! }
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
