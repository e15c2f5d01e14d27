//! Error-to-HTTP response conversion.
//!
//! Error bodies are plain-text diagnostics; only successful responses are
//! JSON.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use imager_common::Error;

/// Handler error carrying a status and a human-readable message.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, e.to_string())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(e: MultipartRejection) -> Self {
        Self::new(
            e.status(),
            format!("error parsing multipart form: {}", e.body_text()),
        )
    }
}

// Body-limit overruns surface here as 413.
impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        Self::new(
            e.status(),
            format!("error retrieving file from form-data: {}", e.body_text()),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                error = %self.message,
                "Server error in API handler"
            );
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "Request rejected");
        }

        (self.status, self.message).into_response()
    }
}
