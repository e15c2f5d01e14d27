//! Imager-DB: Database schema, migrations, and query operations
//!
//! This crate provides metadata persistence for imager using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Image records and the original/resized pairing
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use imager_db::models::Image;
//! use imager_db::pool::{get_conn, init_pool};
//! use imager_db::queries::images;
//!
//! let pool = init_pool("/var/lib/imager/imager.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let image = Image::original("https://bucket/abc.png", "640x480");
//! let id = images::insert_image(&conn, &image).unwrap();
//! println!("Created image: {}", id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
