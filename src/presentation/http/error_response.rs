//! Mapping of pipeline errors onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::domain::errors::MemeError;

/// Status code for an error: 413 for oversized uploads, 400 for other
/// client errors, 500 otherwise.
#[must_use]
pub fn status_for(error: &MemeError) -> StatusCode {
    match error {
        MemeError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Converts a multipart stream error, keeping body-limit violations apart.
#[must_use]
pub fn from_multipart(error: &MultipartError, limit: usize) -> MemeError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        MemeError::UploadTooLarge { limit }
    } else {
        MemeError::malformed(error.body_text())
    }
}

impl IntoResponse for MemeError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let cause: &(dyn std::error::Error + 'static) = &self;
        if status.is_server_error() {
            error!(status = status.as_u16(), error = cause, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = cause, "Request rejected");
        }
        (status, format!("{self}\n")).into_response()
    }
}
