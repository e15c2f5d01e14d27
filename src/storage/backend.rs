use std::sync::Arc;
use std::time::Duration;

use imager_common::{Error, Result};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::ObjectStore;

use super::{Downloader, HttpDownloader, ObjectStoreDownloader, ObjectStoreUploader, Uploader};
use crate::config::{DownloadConfig, StorageBackend, StorageConfig};

/// Open the store selected by `config.backend`.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::S3 => {
            let mut builder = AmazonS3Builder::from_env()
                .with_bucket_name(&config.bucket)
                .with_region(&config.region);
            if let Some(ref endpoint) = config.endpoint {
                builder = builder
                    .with_endpoint(endpoint)
                    .with_allow_http(endpoint.starts_with("http://"));
            }
            let s3 = builder.build().map_err(|e| {
                Error::upload(format!("error configuring bucket {}: {}", config.bucket, e))
            })?;
            Arc::new(s3)
        }
        StorageBackend::Local => {
            let root = config
                .root
                .as_ref()
                .ok_or_else(|| Error::upload("local storage requires a root directory"))?;
            std::fs::create_dir_all(root).map_err(|e| {
                Error::upload(format!("error creating storage root {:?}: {}", root, e))
            })?;
            let local = LocalFileSystem::new_with_prefix(root).map_err(|e| {
                Error::upload(format!("error opening storage root {:?}: {}", root, e))
            })?;
            Arc::new(local)
        }
        StorageBackend::Memory => Arc::new(InMemory::new()),
    };

    tracing::info!(
        backend = ?config.backend,
        bucket = %config.bucket,
        "Blob storage configured"
    );

    Ok(store)
}

/// Upload and download clients for the configured backend.
///
/// Both clients share one store. S3 objects are fetched over their public
/// HTTP location; local and in-memory objects are read back from the store.
pub struct StorageClients {
    pub uploader: Arc<dyn Uploader>,
    pub downloader: Arc<dyn Downloader>,
}

impl StorageClients {
    pub fn from_config(storage: &StorageConfig, download: &DownloadConfig) -> Result<Self> {
        let store = open_store(storage)?;
        let public_base_url = storage.resolved_public_base_url();
        let http = HttpDownloader::new(Duration::from_secs(download.timeout_secs));

        let downloader: Arc<dyn Downloader> = match storage.backend {
            StorageBackend::S3 => Arc::new(http),
            StorageBackend::Local | StorageBackend::Memory => Arc::new(
                ObjectStoreDownloader::new(store.clone(), public_base_url.clone(), http),
            ),
        };

        Ok(Self {
            uploader: Arc::new(ObjectStoreUploader::new(store, public_base_url)),
            downloader,
        })
    }
}
