use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::error::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing fields: {0}")]
    MissingFields(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl AppError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingFields(_) => "MISSING_FIELDS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Generation(e) => match e {
                GenerationError::QuotaExceeded => "NO_FREE_GENERATIONS",
                GenerationError::ProfileIncomplete(_) => "PROFILE_INCOMPLETE",
                GenerationError::GenerationFailed(_) => "GENERATION_FAILED",
                GenerationError::PersistenceFailed(_) => "PERSISTENCE_FAILED",
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::MissingFields(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AppError::Generation(GenerationError::QuotaExceeded) => (
                StatusCode::FORBIDDEN,
                "No free generations left. Please upgrade to premium.".to_string(),
            ),
            AppError::Generation(GenerationError::ProfileIncomplete(msg)) => {
                tracing::info!("Profile incomplete: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Complete your profile before generating documents".to_string(),
                )
            }
            AppError::Generation(GenerationError::GenerationFailed(msg)) => {
                tracing::error!("Generation failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to generate document".to_string(),
                )
            }
            AppError::Generation(GenerationError::PersistenceFailed(msg)) => {
                tracing::error!("Persistence failed after generation: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The document was generated but could not be saved".to_string(),
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
