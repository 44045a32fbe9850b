//! Inkpad-DB: Database schema, migrations, and query operations
//!
//! This crate provides database functionality for inkpad using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use inkpad_db::pool::{init_pool, get_conn};
//! use inkpad_db::queries::images;
//!
//! let pool = init_pool("/var/lib/inkpad/inkpad.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let image = images::insert_image(&conn, "editor_uploads/photo.jpg", Some("admin")).unwrap();
//! println!("Stored image: {}", image.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
