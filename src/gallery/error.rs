use super::FileFailure;
use crate::{repository::RepositoryError, storage::StorageError};
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("All {} file uploads failed", failures.len())]
    Upload { failures: Vec<FileFailure> },

    #[error("Gallery item not found: {0}")]
    NotFound(String),

    #[error("Admin session required")]
    Unauthorized,

    #[error("Malformed upload form: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl GalleryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GalleryError::Validation(_) => StatusCode::BAD_REQUEST,
            GalleryError::Upload { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GalleryError::NotFound(_) => StatusCode::NOT_FOUND,
            GalleryError::Unauthorized => StatusCode::UNAUTHORIZED,
            GalleryError::Multipart(e) => e.status(),
            GalleryError::Repository(_) | GalleryError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            GalleryError::Upload { failures } => serde_json::json!({
                "success": false,
                "error": self.to_string(),
                "failures": failures,
            }),
            GalleryError::Repository(_) => {
                error!("Gallery repository failure: {}", self);
                serde_json::json!({"success": false, "error": "Database error"})
            }
            GalleryError::Storage(_) => {
                error!("Gallery storage failure: {}", self);
                serde_json::json!({"success": false, "error": "Storage error"})
            }
            _ => serde_json::json!({"success": false, "error": self.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}
