//! Resize pipelines coordinating the codec, blob storage, and metadata store.
//!
//! Writes to the two stores are not transactional. A failure after the
//! uploads leaves the objects in place, and a failure saving the derivative
//! leaves the original's record persisted.

use std::sync::Arc;

use bytes::Bytes;
use imager_common::{Dimensions, Error, ImageId, Result};
use imager_db::models::{Image, OriginalResized};
use tokio_util::sync::CancellationToken;

use super::codec;
use super::naming;
use super::repository::ImageRepository;
use super::upload::{upload_one, upload_pair};
use crate::storage::{Downloader, Uploader};

/// Resize service with injected collaborators.
#[derive(Clone)]
pub struct ResizeService {
    repo: Arc<dyn ImageRepository>,
    uploader: Arc<dyn Uploader>,
    downloader: Arc<dyn Downloader>,
}

impl ResizeService {
    pub fn new(
        repo: Arc<dyn ImageRepository>,
        uploader: Arc<dyn Uploader>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            repo,
            uploader,
            downloader,
        }
    }

    /// Every original paired with each of its derivatives.
    pub async fn all(&self) -> Result<Vec<OriginalResized>> {
        self.repo.all().await
    }

    /// Derivative records only.
    pub async fn only_resized(&self) -> Result<Vec<Image>> {
        self.repo.only_resized().await
    }

    /// Resize an uploaded file and persist both it and the derivative.
    ///
    /// `label` names the upload in error messages. The original's resolution
    /// is measured from the decoded input; the derivative's is `target`.
    ///
    /// Both objects are uploaded concurrently. The original's record is then
    /// saved, followed by the derivative's with a back-reference to it.
    pub async fn resize_upload(
        &self,
        data: Bytes,
        label: &str,
        target: Dimensions,
        cancel: &CancellationToken,
    ) -> Result<OriginalResized> {
        let transformed = codec::transform_blocking(data.clone(), target, label.to_string()).await?;
        tracing::debug!(
            source = %transformed.source,
            target = %target,
            "Transformed upload {}",
            label
        );

        let locations = upload_pair(
            self.uploader.as_ref(),
            data,
            transformed.encoded,
            cancel,
        )
        .await
        .map_err(|e| match e {
            Error::Upload(msg) => Error::upload(format!("error uploading images: {msg}")),
            other => other,
        })?;

        let mut original = Image::original(locations.original, transformed.source.resolution());
        let original_id = self.repo.save(&original).await?;
        original.id = Some(original_id);

        let mut resized = Image::derived(original_id, locations.resized, target.resolution());
        let resized_id = self.repo.save(&resized).await?;
        resized.id = Some(resized_id);

        tracing::info!(
            original = %original_id,
            resized = %resized_id,
            resolution = %target,
            "Stored original and resized image"
        );

        Ok(OriginalResized { original, resized })
    }

    /// Resize a previously stored image and persist the new derivative.
    ///
    /// The stored original is fetched from its download location. No new
    /// original record is written; the response pairs the stored record,
    /// unchanged, with the new derivative.
    pub async fn resize_existing(
        &self,
        id: ImageId,
        target: Dimensions,
        cancel: &CancellationToken,
    ) -> Result<OriginalResized> {
        let original = self
            .repo
            .get_one(id)
            .await?
            .ok_or_else(|| Error::not_found("image", id))?;

        let name = naming::object_name(&original.download_url).to_string();
        tracing::debug!(id = %id, object = %name, "Fetching stored original");

        let data = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.downloader.download(&original.download_url) => result?,
        };

        let transformed = codec::transform_blocking(data, target, name).await?;
        let location = upload_one(self.uploader.as_ref(), transformed.encoded, cancel).await?;

        let mut resized = Image::derived(id, location, target.resolution());
        let resized_id = self.repo.save(&resized).await?;
        resized.id = Some(resized_id);

        tracing::info!(
            original = %id,
            resized = %resized_id,
            resolution = %target,
            "Stored resized image"
        );

        Ok(OriginalResized { original, resized })
    }
}
