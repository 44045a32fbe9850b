//! End-to-end tests for the orphaned-image cleanup scan against a real
//! SQLite database and filesystem storage.

mod common;

use common::png_bytes;
use inkpad::catalog::default_catalog;
use inkpad::cleanup::{scan, DbImageStore};
use inkpad::images::{ImageService, ImageStorage};
use inkpad_db::models::EditorImage;
use inkpad_db::pool::{init_pool, DbPool};
use inkpad_db::queries::documents::{insert_document, NewDocument};
use tempfile::TempDir;

struct Fixture {
    pool: DbPool,
    data_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let data_dir = tempfile::tempdir().unwrap();
        let db_path = data_dir.path().join("inkpad.db");
        let pool = init_pool(&db_path.to_string_lossy()).unwrap();
        Self { pool, data_dir }
    }

    fn storage(&self) -> ImageStorage {
        ImageStorage::new(self.data_dir.path().to_path_buf())
    }

    fn service(&self) -> ImageService {
        ImageService::new(self.storage(), self.pool.clone())
    }

    fn store(&self) -> DbImageStore {
        DbImageStore::new(self.pool.clone(), self.storage())
    }

    fn upload(&self) -> EditorImage {
        self.service().store_upload(&png_bytes(), None).unwrap()
    }

    fn write_document(&self, body: &str) {
        let conn = self.pool.get().unwrap();
        insert_document(
            &conn,
            &NewDocument {
                title: "Post",
                body,
                author: None,
                published: true,
            },
        )
        .unwrap();
    }

    fn image_count(&self) -> i64 {
        let conn = self.pool.get().unwrap();
        conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
            .unwrap()
    }
}

#[test]
fn dry_run_reports_without_deleting() {
    let fx = Fixture::new();
    let img1 = fx.upload();
    let img2 = fx.upload();
    let img3 = fx.upload();
    fx.write_document(&format!(r#"<p><img data-image-id="{}"></p>"#, img2.id));

    let report = scan(&fx.store(), &default_catalog(fx.pool.clone()), true).unwrap();

    assert!(report.dry_run);
    assert_eq!(report.total_images, 3);
    assert_eq!(report.sources_checked, 1);
    assert_eq!(report.used_count, 1);
    assert_eq!(report.unused_count, 2);
    assert_eq!(
        report
            .unused_images
            .iter()
            .map(|i| i.id)
            .collect::<Vec<_>>(),
        vec![img1.id, img3.id]
    );
    assert!(report.deleted_ids.is_empty());
    assert!(report.warnings.is_empty());

    // Nothing was touched
    assert_eq!(fx.image_count(), 3);
    for image in [&img1, &img2, &img3] {
        assert!(fx.storage().abs_path(&image.path).exists());
    }
}

#[test]
fn destructive_run_deletes_unreferenced_images() {
    let fx = Fixture::new();
    let img1 = fx.upload();
    let img2 = fx.upload();
    let img3 = fx.upload();
    fx.write_document(&format!(r#"<p><img data-image-id="{}"></p>"#, img2.id));

    let report = scan(&fx.store(), &default_catalog(fx.pool.clone()), false).unwrap();

    assert_eq!(report.deleted_ids, vec![img1.id, img3.id]);
    assert!(report.warnings.is_empty());

    assert_eq!(fx.image_count(), 1);
    assert!(!fx.storage().abs_path(&img1.path).exists());
    assert!(fx.storage().abs_path(&img2.path).exists());
    assert!(!fx.storage().abs_path(&img3.path).exists());
}

#[test]
fn cleanup_with_no_references_deletes_everything() {
    let fx = Fixture::new();
    let img1 = fx.upload();
    let img2 = fx.upload();

    let report = scan(&fx.store(), &default_catalog(fx.pool.clone()), false).unwrap();

    assert_eq!(report.deleted_ids, vec![img1.id, img2.id]);
    assert_eq!(fx.image_count(), 0);
}

#[test]
fn cleanup_is_idempotent() {
    let fx = Fixture::new();
    fx.upload();
    fx.upload();

    let first = scan(&fx.store(), &default_catalog(fx.pool.clone()), false).unwrap();
    assert_eq!(first.deleted_ids.len(), 2);

    let second = scan(&fx.store(), &default_catalog(fx.pool.clone()), false).unwrap();
    assert_eq!(second.total_images, 0);
    assert_eq!(second.unused_count, 0);
    assert!(second.deleted_ids.is_empty());
    assert!(second.warnings.is_empty());
}

#[test]
fn cleanup_with_zero_images() {
    let fx = Fixture::new();
    fx.write_document(r#"<p>no images, just <img data-image-id="42"> a stale marker</p>"#);

    let report = scan(&fx.store(), &default_catalog(fx.pool.clone()), false).unwrap();

    assert_eq!(report.total_images, 0);
    assert_eq!(report.unused_count, 0);
    assert!(report.deleted_ids.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn marker_in_title_counts_as_reference() {
    // Markers are id-based and attribute-agnostic: any text attribute of
    // any registered source protects the image.
    let fx = Fixture::new();
    let img = fx.upload();

    let conn = fx.pool.get().unwrap();
    insert_document(
        &conn,
        &NewDocument {
            title: &format!(r#"odd but legal data-image-id="{}""#, img.id),
            body: "<p>plain</p>",
            author: None,
            published: false,
        },
    )
    .unwrap();
    drop(conn);

    let report = scan(&fx.store(), &default_catalog(fx.pool.clone()), false).unwrap();

    assert_eq!(report.used_count, 1);
    assert!(report.deleted_ids.is_empty());
    assert_eq!(fx.image_count(), 1);
}

#[test]
fn missing_file_degrades_to_warning() {
    let fx = Fixture::new();
    let img = fx.upload();
    std::fs::remove_file(fx.storage().abs_path(&img.path)).unwrap();

    let report = scan(&fx.store(), &default_catalog(fx.pool.clone()), false).unwrap();

    // The record still goes; the missing file is only a warning
    assert_eq!(report.deleted_ids, vec![img.id]);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("File already gone"));
    assert_eq!(fx.image_count(), 0);
}
