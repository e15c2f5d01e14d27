use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use imager_common::{Error, Result};
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use reqwest::{Client, StatusCode};

/// Fetches a previously stored object by its download location.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Bytes>;
}

/// [`Downloader`] over plain HTTP(S) GET.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::download(format!("error downloading {}: {}", url, e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::download(format!(
                "error downloading {}, status code is: {}",
                url,
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::download(format!("error reading body of {}: {}", url, e)))?;

        tracing::debug!(url, size = body.len(), "Downloaded object");
        Ok(body)
    }
}

/// [`Downloader`] that reads locations under `public_base_url` straight from
/// the store. Any other location is fetched over HTTP.
pub struct ObjectStoreDownloader {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
    http: HttpDownloader,
}

impl ObjectStoreDownloader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        public_base_url: impl Into<String>,
        http: HttpDownloader,
    ) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Object key behind `url`, if it lives in this store.
    fn key_of<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_base_url.as_str())?
            .strip_prefix('/')
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl Downloader for ObjectStoreDownloader {
    async fn download(&self, url: &str) -> Result<Bytes> {
        let key = match self.key_of(url) {
            Some(key) => key,
            None => return self.http.download(url).await,
        };

        let body = self
            .store
            .get(&ObjectPath::from(key))
            .await
            .map_err(|e| Error::download(format!("error downloading {}: {}", url, e)))?
            .bytes()
            .await
            .map_err(|e| Error::download(format!("error reading body of {}: {}", url, e)))?;

        tracing::debug!(url, size = body.len(), "Read stored object");
        Ok(body)
    }
}
