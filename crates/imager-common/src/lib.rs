//! Imager-Common: Shared types, constants, and errors.
//!
//! This crate provides common functionality used across imager:
//!
//! - **Typed IDs**: [`ImageId`], the store-assigned identifier of an image record
//! - **Dimensions**: pixel sizes, resolution strings, and resize-target bounds
//! - **Error Handling**: the common error type and its HTTP status mapping
//!
//! # Examples
//!
//! ```
//! use imager_common::{Dimensions, Error, ImageId, Result};
//!
//! let target = Dimensions::parse_target(Some("100"), Some("100")).unwrap();
//! assert_eq!(target.resolution(), "100x100");
//!
//! let id: ImageId = "1".parse().unwrap();
//!
//! fn lookup(id: ImageId) -> Result<()> {
//!     Err(Error::not_found("image", id))
//! }
//! assert_eq!(lookup(id).unwrap_err().http_status(), 404);
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
