//! Common error type used throughout imager.
//!
//! Every failure in the resize pipelines funnels into [`Error`], which carries
//! enough context for the HTTP layer to derive a status code via
//! [`Error::http_status`].

use std::fmt;

/// Common error type for imager.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request parameters failed validation (dimensions, identifiers).
    #[error("{0}")]
    Validation(String),

    /// The request body could not be read (malformed or missing multipart file).
    #[error("{0}")]
    BadRequest(String),

    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "image").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Computing a content digest failed while streaming its input.
    #[error("hash computation failed: {0}")]
    Hash(String),

    /// Bytes were not a recognized raster encoding, or were truncated.
    #[error("decode error: {0}")]
    Decode(String),

    /// The codec failed to encode a raster.
    #[error("encode error: {0}")]
    Encode(String),

    /// Writing an object to blob storage failed.
    #[error("upload error: {0}")]
    Upload(String),

    /// Fetching an object over the network failed.
    #[error("download error: {0}")]
    Download(String),

    /// A metadata store operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// The request was cancelled before the operation finished.
    #[error("operation cancelled")]
    Cancelled,

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::BadRequest(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Hash(_)
            | Error::Decode(_)
            | Error::Encode(_)
            | Error::Upload(_)
            | Error::Download(_)
            | Error::Database(_)
            | Error::Cancelled
            | Error::Internal(_) => 500,
        }
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new BadRequest error.
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new Hash error.
    pub fn hash<S: Into<String>>(msg: S) -> Self {
        Self::Hash(msg.into())
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new Encode error.
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new Upload error.
    pub fn upload<S: Into<String>>(msg: S) -> Self {
        Self::Upload(msg.into())
    }

    /// Create a new Download error.
    pub fn download<S: Into<String>>(msg: S) -> Self {
        Self::Download(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
