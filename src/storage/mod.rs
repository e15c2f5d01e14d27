//! Blob storage clients.
//!
//! The resize pipelines only see the [`Uploader`] and [`Downloader`] traits;
//! concrete clients are chosen from configuration at startup.

mod backend;
mod downloader;
mod uploader;

pub use backend::{open_store, StorageClients};
pub use downloader::{Downloader, HttpDownloader, ObjectStoreDownloader};
pub use uploader::{ObjectStoreUploader, Uploader};
