//! In-process fakes for the pipeline's collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use imager_common::{Error, ImageId, Result};
use imager_db::models::{Image, OriginalResized};

use super::repository::ImageRepository;
use crate::storage::{Downloader, Uploader};

struct Failure {
    payload: Bytes,
    message: String,
    delay: Duration,
}

/// Uploader that records every successful upload.
#[derive(Default)]
pub(crate) struct FakeUploader {
    uploads: Mutex<Vec<(String, Bytes)>>,
    failures: Mutex<Vec<Failure>>,
    hang: AtomicBool,
}

impl FakeUploader {
    /// Fail uploads of `payload` with `message`, after `delay`.
    pub fn fail_on(self, payload: &[u8], message: &str, delay: Duration) -> Self {
        self.failures.lock().unwrap().push(Failure {
            payload: Bytes::copy_from_slice(payload),
            message: message.to_string(),
            delay,
        });
        self
    }

    /// Never complete any upload.
    pub fn hanging() -> Self {
        let uploader = Self::default();
        uploader.hang.store(true, Ordering::SeqCst);
        uploader
    }

    pub fn uploads(&self) -> Vec<(String, Bytes)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, key: &str, data: Bytes) -> Result<String> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.payload == data)
            .map(|f| (f.message.clone(), f.delay));
        if let Some((message, delay)) = failure {
            tokio::time::sleep(delay).await;
            return Err(Error::upload(message));
        }

        self.uploads.lock().unwrap().push((key.to_string(), data));
        Ok(format!("https://fake-bucket.example.com/{key}"))
    }
}

/// Downloader serving a fixed set of URLs.
#[derive(Default)]
pub(crate) struct FakeDownloader {
    objects: Mutex<HashMap<String, Bytes>>,
    hang: AtomicBool,
}

impl FakeDownloader {
    pub fn with_object(self, url: &str, data: impl Into<Bytes>) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(url.to_string(), data.into());
        self
    }

    pub fn hanging() -> Self {
        let downloader = Self::default();
        downloader.hang.store(true, Ordering::SeqCst);
        downloader
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str) -> Result<Bytes> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        self.objects
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| {
                Error::download(format!("error downloading {url}, status code is: 404"))
            })
    }
}

/// Repository holding rows in memory, with injectable failures.
#[derive(Default)]
pub(crate) struct FakeRepository {
    rows: Mutex<Vec<Image>>,
    saves: AtomicUsize,
    fail_save_at: Mutex<Option<usize>>,
    fail_reads: AtomicBool,
}

impl FakeRepository {
    /// Fail the `n`th save (1-based); earlier saves succeed.
    pub fn fail_save_at(self, n: usize) -> Self {
        *self.fail_save_at.lock().unwrap() = Some(n);
        self
    }

    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Insert a row directly, bypassing failure injection.
    pub fn seed(&self, mut image: Image) -> ImageId {
        let mut rows = self.rows.lock().unwrap();
        let id = ImageId::new(rows.len() as i64 + 1);
        image.id = Some(id);
        rows.push(image);
        id
    }

    pub fn rows(&self) -> Vec<Image> {
        self.rows.lock().unwrap().clone()
    }

    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::database("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageRepository for FakeRepository {
    async fn save(&self, image: &Image) -> Result<ImageId> {
        let call = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_save_at.lock().unwrap() == Some(call) {
            return Err(Error::database(format!(
                "inserting of '{:?}' to db failed with error: disk I/O error",
                image
            )));
        }
        Ok(self.seed(image.clone()))
    }

    async fn all(&self) -> Result<Vec<OriginalResized>> {
        self.check_reads()?;
        let rows = self.rows();
        Ok(rows
            .iter()
            .filter_map(|resized| {
                let original_id = resized.original_id?;
                rows.iter()
                    .find(|r| r.id == Some(original_id))
                    .map(|original| OriginalResized {
                        original: original.clone(),
                        resized: resized.clone(),
                    })
            })
            .collect())
    }

    async fn only_resized(&self) -> Result<Vec<Image>> {
        self.check_reads()?;
        Ok(self
            .rows()
            .into_iter()
            .filter(Image::is_derivative)
            .collect())
    }

    async fn get_one(&self, id: ImageId) -> Result<Option<Image>> {
        self.check_reads()?;
        Ok(self.rows().into_iter().find(|r| r.id == Some(id)))
    }
}
