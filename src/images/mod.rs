//! Image resize pipelines.
//!
//! Uploaded or previously stored images are decoded, resized, re-encoded as
//! PNG, uploaded to blob storage under content-addressed keys, and recorded
//! in the metadata store through [`ImageRepository`].

pub mod codec;
pub mod naming;
mod repository;
mod service;
#[cfg(test)]
pub(crate) mod testing;
mod upload;

pub use repository::{ImageRepository, SqliteImageRepository};
pub use service::ResizeService;
pub use upload::{upload_one, upload_pair, UploadedPair};
