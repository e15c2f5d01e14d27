use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use imager_common::{Error, Result};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};

/// Writes an object and reports where it can be downloaded from.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Store `data` under `key`, overwriting any existing object, and return
    /// its download location.
    async fn upload(&self, key: &str, data: Bytes) -> Result<String>;
}

/// [`Uploader`] backed by any [`ObjectStore`].
pub struct ObjectStoreUploader {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl ObjectStoreUploader {
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Location an object stored under `key` is served from.
    pub fn location(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl Uploader for ObjectStoreUploader {
    async fn upload(&self, key: &str, data: Bytes) -> Result<String> {
        let path = ObjectPath::from(key);
        let size = data.len();

        self.store
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| Error::upload(format!("error uploading file {}: {}", key, e)))?;

        tracing::debug!(key, size, "Uploaded object");
        Ok(self.location(key))
    }
}
