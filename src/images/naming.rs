//! Content hashing and content-addressed object keys.

use std::io::Read;

use imager_common::{Error, Result};
use sha2::{Digest, Sha256};

use super::codec;

/// Number of digest bytes kept (128 bits, 32 hex characters).
const DIGEST_BYTES: usize = 16;

/// Compute the content digest of everything `reader` yields.
///
/// Returns the first 16 bytes of the SHA-256 digest as lowercase hex. The
/// digest names objects consistently; it is not a security property.
/// Read failures surface as [`Error::Hash`].
pub fn content_digest<R: Read>(mut reader: R) -> Result<String> {
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)
        .map_err(|e| Error::hash(format!("calculating digest failed with error: {e}")))?;
    let digest = hasher.finalize();
    Ok(hex::encode(&digest[..DIGEST_BYTES]))
}

/// Storage key for a digest: `"<digest>.<lowercase-extension>"`.
pub fn object_key(digest: &str, extension: &str) -> String {
    format!("{}.{}", digest, extension.to_lowercase())
}

/// Hash `data` and derive its key with the canonical output extension.
pub fn content_key(data: &[u8]) -> Result<String> {
    let digest = content_digest(data)?;
    Ok(object_key(&digest, codec::output_extension()))
}

/// Last path segment of a download location, used to name it in messages.
pub fn object_name(location: &str) -> &str {
    let trimmed = location.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
