//! Image records and the original/resized pairing.
//!
//! Field names on the wire follow the service's public JSON contract
//! (`ID`, `DownloadURL`, `Resolution`, `OriginalID`).

use imager_common::ImageId;
use serde::{Deserialize, Serialize};

/// A persisted artifact record.
///
/// `id` is `None` until the record has been written; `original_id` is set
/// only on derivatives and names the record they were resized from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "ID", default)]
    pub id: Option<ImageId>,
    #[serde(rename = "DownloadURL")]
    pub download_url: String,
    #[serde(rename = "Resolution")]
    pub resolution: String,
    #[serde(
        rename = "OriginalID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_id: Option<ImageId>,
}

impl Image {
    /// A not-yet-persisted original.
    pub fn original(download_url: impl Into<String>, resolution: impl Into<String>) -> Self {
        Self {
            id: None,
            download_url: download_url.into(),
            resolution: resolution.into(),
            original_id: None,
        }
    }

    /// A not-yet-persisted derivative of `original_id`.
    pub fn derived(
        original_id: ImageId,
        download_url: impl Into<String>,
        resolution: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            download_url: download_url.into(),
            resolution: resolution.into(),
            original_id: Some(original_id),
        }
    }

    /// Whether this record was produced by resizing another.
    pub fn is_derivative(&self) -> bool {
        self.original_id.is_some()
    }
}

/// An original and one of its derivatives.
///
/// Never stored as a row of its own: it is either a read-time join or the
/// pairing of two rows written by one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalResized {
    #[serde(rename = "Original")]
    pub original: Image,
    #[serde(rename = "Resized")]
    pub resized: Image,
}
