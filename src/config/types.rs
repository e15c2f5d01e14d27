use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides `storage.bucket`.
pub const BUCKET_ENV: &str = "BUCKETNAME";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on a request body, enforced before multipart parsing.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("imager.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Local,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom S3-compatible endpoint (MinIO, localstack).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Directory for the local backend.
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Prefix of returned download locations. Derived from the backend when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_bucket() -> String {
    "try-imager".to_string()
}
fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            root: None,
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// Base URL that object keys are appended to, without a trailing slash.
    pub fn resolved_public_base_url(&self) -> String {
        if let Some(ref url) = self.public_base_url {
            return url.trim_end_matches('/').to_string();
        }

        match self.backend {
            StorageBackend::S3 => match self.endpoint {
                Some(ref endpoint) => {
                    format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
                }
                None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
            },
            StorageBackend::Local => {
                let root = self.root.clone().unwrap_or_default();
                format!("file://{}", root.display().to_string().trim_end_matches('/'))
            }
            StorageBackend::Memory => format!("memory://{}", self.bucket),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}
