//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::request::GenerateDocumentBody;
use crate::models::document::{Document, DocumentKind};
use crate::routes::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub id: Uuid,
    pub status: &'static str,
    pub message: String,
    pub document: Document,
}

/// POST /api/v1/documents/generate
///
/// Document kind comes from the body's `type`.
pub async fn handle_generate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<GenerateDocumentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    run(state, user_id, body, None).await
}

/// POST /api/v1/documents/resume
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<GenerateDocumentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    run(state, user_id, body, Some(DocumentKind::Resume)).await
}

/// POST /api/v1/documents/cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<GenerateDocumentBody>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    run(state, user_id, body, Some(DocumentKind::CoverLetter)).await
}

async fn run(
    state: AppState,
    user_id: Uuid,
    body: Result<Json<GenerateDocumentBody>, JsonRejection>,
    kind: Option<DocumentKind>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let Json(body) =
        body.map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;
    let request = body.into_request(kind)?;

    let outcome = state.orchestrator.generate(user_id, request).await?;

    let message = match outcome.document.kind {
        DocumentKind::Resume => "Resume generated successfully",
        DocumentKind::CoverLetter => "Cover letter generated successfully",
    };

    Ok((
        StatusCode::CREATED,
        Json(GenerateResponse {
            id: outcome.document.id,
            status: "completed",
            message: message.to_string(),
            document: outcome.document,
        }),
    ))
}
