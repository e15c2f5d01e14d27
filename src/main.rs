mod cli;

use imager::{
    config::{self, Config},
    images::{ResizeService, SqliteImageRepository},
    server::{self, AppContext},
    storage::StorageClients,
};
use imager_db::pool::init_pool;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Imager server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let service = build_service(&config)?;
    server::start_server(AppContext::new(config, service)).await
}

/// Wire the metadata store and blob storage clients into the resize pipelines.
fn build_service(config: &Config) -> Result<ResizeService> {
    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path);
    let pool = init_pool(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    let storage = StorageClients::from_config(&config.storage, &config.download)
        .context("Failed to configure blob storage")?;

    Ok(ResizeService::new(
        Arc::new(SqliteImageRepository::new(pool)),
        storage.uploader,
        storage.downloader,
    ))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imager=trace,imager_db=debug,tower_http=debug".to_string()
        } else {
            "imager=debug,imager_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate { path } => {
            let path = path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("imager {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::load_config_or_default(None)?
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Max upload: {} bytes", config.server.max_upload_bytes);
    println!("  Database: {}", config.database.path.display());
    println!(
        "  Storage: {:?} (bucket {})",
        config.storage.backend, config.storage.bucket
    );
    println!(
        "  Download locations: {}/<key>",
        config.storage.resolved_public_base_url()
    );

    Ok(())
}
