//! Raster decode, nearest-neighbour resize, and canonical re-encode.
//!
//! Every derivative is written as PNG regardless of the input format.

use std::io::Cursor;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageResult};
use imager_common::{Dimensions, Error, Result};

/// The single output encoding for all derivatives.
pub const OUTPUT_FORMAT: ImageFormat = ImageFormat::Png;

/// Lowercase file extension of [`OUTPUT_FORMAT`].
pub fn output_extension() -> &'static str {
    OUTPUT_FORMAT.extensions_str().first().copied().unwrap_or("png")
}

/// Decode any supported raster encoding.
pub fn decode(data: &[u8]) -> ImageResult<DynamicImage> {
    image::load_from_memory(data)
}

/// Resize to exactly `target`, ignoring aspect ratio.
///
/// Targets are validated upstream; any positive dimensions are accepted here.
pub fn resize(img: &DynamicImage, target: Dimensions) -> DynamicImage {
    img.resize_exact(target.width, target.height, FilterType::Nearest)
}

/// Encode into [`OUTPUT_FORMAT`].
pub fn encode(img: &DynamicImage) -> ImageResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, OUTPUT_FORMAT)?;
    Ok(buf.into_inner())
}

/// Pixel dimensions of a decoded raster.
pub fn dimensions_of(img: &DynamicImage) -> Dimensions {
    Dimensions::new(img.width(), img.height())
}

/// Result of [`transform`]: the source size and the encoded derivative.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Dimensions of the decoded input, measured before resizing.
    pub source: Dimensions,
    /// The resized raster, encoded in [`OUTPUT_FORMAT`].
    pub encoded: Bytes,
}

/// Decode, resize, and re-encode in one step.
///
/// `label` names the input in error messages (an upload filename or the
/// stored object name).
pub fn transform(data: &[u8], target: Dimensions, label: &str) -> Result<Transformed> {
    let img = decode(data)
        .map_err(|e| Error::decode(format!("error decoding file {label} into image: {e}")))?;
    let source = dimensions_of(&img);

    tracing::debug!(%source, %target, "Resizing {}", label);
    let resized = resize(&img, target);

    let encoded = encode(&resized)
        .map_err(|e| Error::encode(format!("error encoding file {label} to buffer: {e}")))?;

    Ok(Transformed {
        source,
        encoded: Bytes::from(encoded),
    })
}

/// Run [`transform`] on the blocking thread pool.
pub async fn transform_blocking(
    data: Bytes,
    target: Dimensions,
    label: String,
) -> Result<Transformed> {
    tokio::task::spawn_blocking(move || transform(&data, target, &label))
        .await
        .map_err(|e| Error::internal(format!("image transform task failed: {e}")))?
}
