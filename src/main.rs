mod cli;

use inkpad::{
    catalog, cleanup,
    cleanup::ScanReport,
    config,
    images::ImageStorage,
    server::{self, auth},
};
use inkpad_db::pool::init_pool;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "inkpad=trace,inkpad_db=debug,inkpad_common=debug,tower_http=debug".to_string()
        } else {
            "inkpad=debug,inkpad_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            // Create tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::CleanupImages { dry_run } => cleanup_images(cli.config.as_deref(), dry_run),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("inkpad {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::HashPassword { password } => hash_password(&password),
        Commands::GenerateApiKey => generate_api_key(),
    }
}

/// Open the database under the configured data dir, creating it on demand.
fn open_pool(config: &config::Config) -> Result<inkpad_db::pool::DbPool> {
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {:?}",
            config.storage.data_dir
        )
    })?;

    let db_path = config.storage.db_path();
    tracing::info!("Opening database at {}", db_path.display());
    init_pool(&db_path.to_string_lossy()).context("Failed to open database")
}

async fn serve(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting inkpad server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let db_pool = open_pool(&config)?;

    server::start_server(config, db_pool).await
}

fn cleanup_images(config_path: Option<&std::path::Path>, dry_run: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let db_pool = open_pool(&config)?;

    let storage = ImageStorage::new(config.storage.data_dir.clone());
    let store = cleanup::DbImageStore::new(db_pool.clone(), storage);
    let catalog = catalog::default_catalog(db_pool);

    println!("Searching for content sources with text attributes...");
    let report = cleanup::scan(&store, &catalog, dry_run)?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &ScanReport) {
    println!("Found {} uploaded images", report.total_images);
    println!("Checked {} content sources", report.sources_checked);
    println!("Found {} images in use", report.used_count);

    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    if report.unused_count == 0 {
        println!("No unused images found!");
        return;
    }

    println!("Found {} unused images", report.unused_count);

    if report.dry_run {
        println!("DRY RUN - No images will be deleted");
        for image in &report.unused_images {
            println!("  Would delete: {} (ID: {})", image.path, image.id);
        }
    } else {
        for image in &report.unused_images {
            println!("  Deleted: {} (ID: {})", image.path, image.id);
        }
        println!(
            "Successfully deleted {} unused images",
            report.deleted_ids.len()
        );
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Auth enabled: {}", config.server.auth.enabled);
            println!("  Data dir: {:?}", config.storage.data_dir);
            println!("  Max upload: {} bytes", config.storage.max_upload_bytes);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Data dir: {:?}", config.storage.data_dir);
        }
    }

    Ok(())
}

fn hash_password(password: &str) -> Result<()> {
    let hash = auth::hash_password(password)?;
    println!("{}", hash);
    Ok(())
}

fn generate_api_key() -> Result<()> {
    let key = auth::generate_api_key();
    println!("{}", key);
    Ok(())
}
