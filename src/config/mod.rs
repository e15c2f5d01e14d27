mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_bucket_override(&mut config, std::env::var(BUCKET_ENV).ok());
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./imager.toml",
        "./config.toml",
        "~/.config/imager/config.toml",
        "/etc/imager/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_bucket_override(&mut config, std::env::var(BUCKET_ENV).ok());
    Ok(config)
}

fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Replace the configured bucket when the override is set and non-empty.
fn apply_bucket_override(config: &mut Config, bucket: Option<String>) {
    if let Some(bucket) = bucket.filter(|b| !b.trim().is_empty()) {
        tracing::debug!("Using bucket {} from {}", bucket, BUCKET_ENV);
        config.storage.bucket = bucket;
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes cannot be 0");
    }

    if config.storage.bucket.is_empty() && config.storage.backend == StorageBackend::S3 {
        anyhow::bail!("S3 storage requires a bucket name");
    }

    if config.storage.backend == StorageBackend::Local && config.storage.root.is_none() {
        anyhow::bail!("Local storage requires storage.root");
    }

    Ok(())
}
