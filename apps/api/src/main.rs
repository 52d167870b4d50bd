mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::observer::TracingReporter;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::generation::provider::LlmProvider;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_max_connections).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize LLM client and provider
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.generation_timeout,
    )?;
    let provider = Arc::new(LlmProvider::new(llm, config.provider_settings()));
    info!(
        "LLM provider initialized (model: {}, resume max_tokens: {}, cover letter max_tokens: {})",
        config.openai_model, config.resume_max_tokens, config.cover_letter_max_tokens
    );

    let orchestrator = GenerationOrchestrator::new(
        store,
        provider,
        Arc::new(TracingReporter),
        config.rates,
        config.pipeline_settings(),
    );
    info!(
        "Pricing: ${}/1M input, ${}/1M output; provider attempts: {}",
        config.rates.input_per_million,
        config.rates.output_per_million,
        config.generation_max_attempts
    );

    // Build app state
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the frontend origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
