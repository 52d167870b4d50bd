pub mod auth;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route(
            "/api/v1/documents/generate",
            post(handlers::handle_generate),
        )
        .route(
            "/api/v1/documents/resume",
            post(handlers::handle_generate_resume),
        )
        .route(
            "/api/v1/documents/cover-letter",
            post(handlers::handle_generate_cover_letter),
        )
        .with_state(state)
}
