//! Database query modules.
//!
//! - images: image record inserts, lookups, and original/resized listings

pub mod images;
