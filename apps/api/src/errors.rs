use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::sheets::error::SheetError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A label that cannot be printed without clipping.
    #[error("Text overflow: {0}")]
    TextOverflow(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SheetError> for AppError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::RowMismatch { .. }
            | SheetError::ColumnMismatch { .. }
            | SheetError::EmptyRenderSet => AppError::Validation(err.to_string()),
            SheetError::TextOverflow { .. } => AppError::TextOverflow(err.to_string()),
            SheetError::InvalidTemplate { .. } | SheetError::Io(_) => {
                AppError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::TextOverflow(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "TEXT_OVERFLOW",
                msg.clone(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
