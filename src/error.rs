//! Request-level error type and its HTTP rendering.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::dive::{ImportError, RequestError};

/// Errors that reject a whole request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Invalid request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("Invalid upload: {0}")]
    Upload(#[from] MultipartError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request rejected");
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
