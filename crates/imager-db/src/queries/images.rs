//! Image database queries.
//!
//! This module provides inserts and lookups for image records, plus the two
//! listings served by the API: original/resized pairs and derivatives only.

use imager_common::{Error, ImageId, Result};
use rusqlite::Connection;

use crate::models::{Image, OriginalResized};

/// Parse an image from a database row.
///
/// Expects columns in order: id, download_url, resolution, original_id.
fn parse_image_row(row: &rusqlite::Row) -> rusqlite::Result<Image> {
    Ok(Image {
        id: Some(ImageId::new(row.get(0)?)),
        download_url: row.get(1)?,
        resolution: row.get(2)?,
        original_id: row.get::<_, Option<i64>>(3)?.map(ImageId::new),
    })
}

/// Insert a new image record.
///
/// The store assigns the identifier. A derivative's `original_id` must name an
/// existing row; the foreign key rejects anything else.
///
/// # Returns
///
/// * `Ok(ImageId)` - The ID assigned to the inserted image
/// * `Err(Error)` - If a database error occurs
pub fn insert_image(conn: &Connection, image: &Image) -> Result<ImageId> {
    conn.query_row(
        "INSERT INTO images (download_url, resolution, original_id)
         VALUES (:download_url, :resolution, :original_id)
         RETURNING id",
        rusqlite::named_params! {
            ":download_url": &image.download_url,
            ":resolution": &image.resolution,
            ":original_id": image.original_id.map(ImageId::get),
        },
        |row| row.get::<_, i64>(0),
    )
    .map(ImageId::new)
    .map_err(|e| {
        Error::database(format!(
            "inserting of '{:?}' to db failed with error: {}",
            image, e
        ))
    })
}

/// Get an image by ID.
///
/// # Returns
///
/// * `Ok(Some(Image))` - The image if found
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<Image>> {
    let result = conn.query_row(
        "SELECT id, download_url, resolution, original_id
         FROM images WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
        parse_image_row,
    );

    match result {
        Ok(image) => Ok(Some(image)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(format!(
            "error getting image by ID: {}, error: {}",
            id, e
        ))),
    }
}

/// List every original joined with each of its derivatives.
///
/// An original with several derivatives appears once per derivative;
/// originals without derivatives do not appear. Ordered by derivative ID.
pub fn list_original_resized(conn: &Connection) -> Result<Vec<OriginalResized>> {
    const ERR: &str = "error getting all images from DB";

    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.download_url, a.resolution, a.original_id,
                    b.id, b.download_url, b.resolution, b.original_id
             FROM images a
             JOIN images b ON b.original_id = a.id
             ORDER BY b.id",
        )
        .map_err(|e| Error::database(format!("{ERR}: {e}")))?;

    let pairs = stmt
        .query_map([], |row| {
            Ok(OriginalResized {
                original: Image {
                    id: Some(ImageId::new(row.get(0)?)),
                    download_url: row.get(1)?,
                    resolution: row.get(2)?,
                    original_id: row.get::<_, Option<i64>>(3)?.map(ImageId::new),
                },
                resized: Image {
                    id: Some(ImageId::new(row.get(4)?)),
                    download_url: row.get(5)?,
                    resolution: row.get(6)?,
                    original_id: row.get::<_, Option<i64>>(7)?.map(ImageId::new),
                },
            })
        })
        .map_err(|e| Error::database(format!("{ERR}: {e}")))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(format!("{ERR}: {e}")))?;

    Ok(pairs)
}

/// List only derivatives (records with a back-reference), ordered by ID.
pub fn list_resized(conn: &Connection) -> Result<Vec<Image>> {
    const ERR: &str = "error getting only resized images from DB";

    let mut stmt = conn
        .prepare(
            "SELECT id, download_url, resolution, original_id
             FROM images
             WHERE original_id IS NOT NULL
             ORDER BY id",
        )
        .map_err(|e| Error::database(format!("{ERR}: {e}")))?;

    let images = stmt
        .query_map([], parse_image_row)
        .map_err(|e| Error::database(format!("{ERR}: {e}")))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(format!("{ERR}: {e}")))?;

    Ok(images)
}
