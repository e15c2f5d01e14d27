//! Concurrent upload of an original and its derivative.

use bytes::Bytes;
use futures::stream::{FuturesUnordered, StreamExt};
use imager_common::{Error, Result};
use tokio_util::sync::CancellationToken;

use super::naming;
use crate::storage::Uploader;

/// Download locations of an uploaded original/derivative pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPair {
    pub original: String,
    pub resized: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Original,
    Resized,
}

/// Hash `data`, derive its key, and upload it.
///
/// The upload is abandoned with [`Error::Cancelled`] as soon as `cancel` fires.
pub async fn upload_one(
    uploader: &dyn Uploader,
    data: Bytes,
    cancel: &CancellationToken,
) -> Result<String> {
    let key = naming::content_key(&data)?;
    tracing::debug!(key = %key, size = data.len(), "Uploading object");

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = uploader.upload(&key, data) => result,
    }
}

async fn branch(
    slot: Slot,
    uploader: &dyn Uploader,
    data: Bytes,
    cancel: &CancellationToken,
) -> (Slot, Result<String>) {
    (slot, upload_one(uploader, data, cancel).await)
}

/// Upload both payloads concurrently and wait for both to finish.
///
/// On failure exactly one error is returned: the first to complete. Uploads
/// that already succeeded are left in place.
pub async fn upload_pair(
    uploader: &dyn Uploader,
    original: Bytes,
    resized: Bytes,
    cancel: &CancellationToken,
) -> Result<UploadedPair> {
    let mut pending = FuturesUnordered::new();
    pending.push(branch(Slot::Original, uploader, original, cancel));
    pending.push(branch(Slot::Resized, uploader, resized, cancel));

    let mut original_location = None;
    let mut resized_location = None;
    let mut first_error: Option<Error> = None;

    while let Some((slot, result)) = pending.next().await {
        match result {
            Ok(location) => match slot {
                Slot::Original => original_location = Some(location),
                Slot::Resized => resized_location = Some(location),
            },
            Err(e) => {
                tracing::warn!(slot = ?slot, error = %e, "Upload failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    match (original_location, resized_location) {
        (Some(original), Some(resized)) => Ok(UploadedPair { original, resized }),
        _ => Err(Error::internal("upload finished without a location")),
    }
}
