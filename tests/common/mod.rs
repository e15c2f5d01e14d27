//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires the real resize pipelines to an
//! in-memory SQLite pool and an in-memory object store. Locations under the
//! test bucket are read back from the store; any other location goes over
//! real HTTP, so by-ID tests can serve hand-inserted originals from `wiremock`.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imager::config::Config;
use imager::images::{ImageRepository, ResizeService, SqliteImageRepository};
use imager::server::{create_router, AppContext};
use imager::storage::{
    HttpDownloader, ObjectStoreDownloader, ObjectStoreUploader, StorageClients, Uploader,
};
use imager_common::{Error, ImageId, Result};
use imager_db::models::{Image, OriginalResized};
use imager_db::pool::{get_conn, init_memory_pool, DbPool, PooledConnection};
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tower::ServiceExt;

pub const PUBLIC_BASE_URL: &str = "memory://test-bucket";
pub const BOUNDARY: &str = "imager-test-boundary";

/// Uploader that counts calls before delegating.
pub struct CountingUploader {
    inner: ObjectStoreUploader,
    calls: AtomicUsize,
}

#[async_trait]
impl Uploader for CountingUploader {
    async fn upload(&self, key: &str, data: Bytes) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.upload(key, data).await
    }
}

/// Repository that fails one chosen save and delegates everything else.
pub struct FlakyRepository {
    inner: SqliteImageRepository,
    saves: AtomicUsize,
    fail_save_at: Option<usize>,
}

#[async_trait]
impl ImageRepository for FlakyRepository {
    async fn save(&self, image: &Image) -> Result<ImageId> {
        let call = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_save_at == Some(call) {
            return Err(Error::database(format!(
                "inserting of '{:?}' to db failed with error: database is locked",
                image
            )));
        }
        self.inner.save(image).await
    }

    async fn all(&self) -> Result<Vec<OriginalResized>> {
        self.inner.all().await
    }

    async fn only_resized(&self) -> Result<Vec<Image>> {
        self.inner.only_resized().await
    }

    async fn get_one(&self, id: ImageId) -> Result<Option<Image>> {
        self.inner.get_one(id).await
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub store: Arc<InMemory>,
    uploader: Arc<CountingUploader>,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::build(Config::default(), None)
    }

    /// Create a new harness with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self::build(config, None)
    }

    /// Create a harness whose `n`th metadata save fails (1-based).
    pub fn failing_save_at(n: usize) -> Self {
        Self::build(Config::default(), Some(n))
    }

    fn build(config: Config, fail_save_at: Option<usize>) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let store = Arc::new(InMemory::new());

        let uploader = Arc::new(CountingUploader {
            inner: ObjectStoreUploader::new(store.clone(), PUBLIC_BASE_URL),
            calls: AtomicUsize::new(0),
        });
        let repo = Arc::new(FlakyRepository {
            inner: SqliteImageRepository::new(db.clone()),
            saves: AtomicUsize::new(0),
            fail_save_at,
        });
        let downloader = Arc::new(ObjectStoreDownloader::new(
            store.clone(),
            PUBLIC_BASE_URL,
            HttpDownloader::new(Duration::from_secs(5)),
        ));

        let service = ResizeService::new(repo, uploader.clone(), downloader);
        let ctx = AppContext::new(config, service);

        Self {
            ctx,
            db,
            store,
            uploader,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    /// Send one request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn image_count(&self) -> i64 {
        self.conn()
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
            .expect("failed to count images")
    }

    pub fn upload_calls(&self) -> usize {
        self.uploader.calls.load(Ordering::SeqCst)
    }

    /// Bytes stored behind a download location returned by the service.
    pub async fn stored_object(&self, location: &str) -> Bytes {
        let key = location
            .strip_prefix(&format!("{PUBLIC_BASE_URL}/"))
            .expect("location outside the test bucket");
        self.store
            .get(&ObjectPath::from(key))
            .await
            .expect("object not stored")
            .bytes()
            .await
            .expect("failed to read stored object")
    }
}

/// Router wired the way `imager start` wires it, with storage clients built
/// from `config.storage` and an in-memory database.
pub fn router_from_config(config: Config) -> Router {
    let db = init_memory_pool().expect("failed to create in-memory pool");
    let storage = StorageClients::from_config(&config.storage, &config.download)
        .expect("failed to configure storage");
    let service = ResizeService::new(
        Arc::new(SqliteImageRepository::new(db)),
        storage.uploader,
        storage.downloader,
    );
    create_router(AppContext::new(config, service))
}

/// Send one request through a clone of `router`.
pub async fn send_to(router: &Router, request: Request<Body>) -> Response {
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

/// Encode a gradient test image.
pub fn sample_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut img = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, 200]);
    }
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .expect("failed to encode sample image");
    buf.into_inner()
}

pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    sample_image(width, height, ImageFormat::Jpeg)
}

/// Build a `multipart/form-data` POST with a single file field.
pub fn multipart_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

/// Helper to get response body as string
pub async fn body_to_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}
