//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, default config,
//! tempdir-backed image storage, and a full [`AppContext`]. The
//! [`with_server`] constructor starts Axum on a random port for HTTP-level
//! testing.

use std::net::SocketAddr;
use std::sync::Arc;

use inkpad::config::Config;
use inkpad::images::{ImageService, ImageStorage};
use inkpad::server::{create_router, AppContext};
use inkpad_db::pool::{get_conn, init_memory_pool, DbPool, PooledConnection};
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a temporary upload directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub data_dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let data_dir = tempfile::tempdir().expect("failed to create temp dir");

        let storage = ImageStorage::new(data_dir.path().to_path_buf());
        let images = Arc::new(ImageService::new(storage, db.clone()));

        let ctx = AppContext {
            config: Arc::new(config),
            db_pool: db.clone(),
            images,
        };

        Self { ctx, db, data_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::spawn(Self::new()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        Self::spawn(Self::with_config(config)).await
    }

    async fn spawn(harness: Self) -> (Self, SocketAddr) {
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    /// A storage handle rooted at the harness data dir.
    pub fn storage(&self) -> ImageStorage {
        ImageStorage::new(self.data_dir.path().to_path_buf())
    }
}

/// Minimal valid PNG bytes for upload tests.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(2, 2);
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("failed to encode test png");
    buf.into_inner()
}
