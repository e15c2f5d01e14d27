//! Image listing and resize API routes.
//!
//! Provides endpoints for listing stored originals and derivatives, resizing
//! an uploaded file, and resizing a previously stored image by ID.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use imager_common::{Dimensions, Error, ImageId};
use imager_db::models::{Image, OriginalResized};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::error::AppError;
use super::AppContext;

/// Multipart field carrying the uploaded image.
const FILE_FIELD: &str = "file";

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/images", get(list_images).post(resize_upload))
        .route("/images/resized", get(list_resized))
        .route("/images/:id", post(resize_existing))
}

// ============================================================================
// Request types
// ============================================================================

/// Resize target from the query string.
///
/// Values are kept as raw strings so missing and malformed values are
/// reported with the parameter name.
#[derive(Debug, Default, Deserialize)]
pub struct ResizeQuery {
    #[serde(alias = "width")]
    pub weight: Option<String>,
    pub height: Option<String>,
}

impl ResizeQuery {
    fn target(&self) -> Result<Dimensions, Error> {
        Dimensions::parse_target(self.weight.as_deref(), self.height.as_deref())
            .map_err(|e| Error::validation(format!("error validating resize params: {e}")))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List every original paired with each of its derivatives.
async fn list_images(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<OriginalResized>>, AppError> {
    Ok(Json(ctx.images.all().await?))
}

/// List derivative records only.
async fn list_resized(State(ctx): State<AppContext>) -> Result<Json<Vec<Image>>, AppError> {
    Ok(Json(ctx.images.only_resized().await?))
}

/// Resize an uploaded file.
///
/// The target is validated before the body is read, so a bad target never
/// reaches storage.
async fn resize_upload(
    State(ctx): State<AppContext>,
    Query(query): Query<ResizeQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<OriginalResized>), AppError> {
    let target = query.target()?;
    let mut multipart = multipart?;
    let (label, data) = read_file_field(&mut multipart).await?;

    tracing::debug!(file = %label, size = data.len(), target = %target, "Received upload");

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let pair = ctx
        .images
        .resize_upload(data, &label, target, &cancel)
        .await?;

    Ok((StatusCode::CREATED, Json(pair)))
}

/// Resize a previously stored image.
async fn resize_existing(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(query): Query<ResizeQuery>,
) -> Result<(StatusCode, Json<OriginalResized>), AppError> {
    let target = query.target()?;
    let id: ImageId = id.parse()?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let pair = ctx.images.resize_existing(id, target, &cancel).await?;

    Ok((StatusCode::CREATED, Json(pair)))
}

/// Read the first `file` field fully into memory.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let label = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let data = field.bytes().await?;
        return Ok((label, data));
    }

    Err(Error::bad_request(format!(
        "error retrieving file from form-data: no '{FILE_FIELD}' field"
    ))
    .into())
}
