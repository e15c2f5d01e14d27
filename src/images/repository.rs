//! Metadata persistence contract used by the resize pipelines.

use async_trait::async_trait;
use imager_common::{Error, ImageId, Result};
use imager_db::models::{Image, OriginalResized};
use imager_db::pool::{get_conn, DbPool};
use imager_db::queries::images;
use rusqlite::Connection;

/// Durable storage of image records.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Persist a new record and return its assigned identifier.
    async fn save(&self, image: &Image) -> Result<ImageId>;

    /// Every original paired with each of its derivatives.
    async fn all(&self) -> Result<Vec<OriginalResized>>;

    /// Derivatives only.
    async fn only_resized(&self) -> Result<Vec<Image>>;

    async fn get_one(&self, id: ImageId) -> Result<Option<Image>>;
}

/// [`ImageRepository`] over the SQLite pool.
///
/// Each call runs on the blocking pool. A write that has started completes
/// even if the caller stops waiting for it.
#[derive(Clone)]
pub struct SqliteImageRepository {
    pool: DbPool,
}

impl SqliteImageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::internal(format!("database task failed: {e}")))?
    }
}

#[async_trait]
impl ImageRepository for SqliteImageRepository {
    async fn save(&self, image: &Image) -> Result<ImageId> {
        let image = image.clone();
        let id = self
            .with_conn(move |conn| images::insert_image(conn, &image))
            .await?;
        tracing::info!(id = %id, "Saved image record");
        Ok(id)
    }

    async fn all(&self) -> Result<Vec<OriginalResized>> {
        self.with_conn(images::list_original_resized).await
    }

    async fn only_resized(&self) -> Result<Vec<Image>> {
        self.with_conn(images::list_resized).await
    }

    async fn get_one(&self, id: ImageId) -> Result<Option<Image>> {
        self.with_conn(move |conn| images::get_image(conn, id)).await
    }
}
