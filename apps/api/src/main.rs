mod ai;
mod config;
mod db;
mod errors;
mod models;
mod queue;
mod reports;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai::gemini::GeminiProvider;
use crate::ai::groq::GroqProvider;
use crate::ai::{AiProvider, GenerationService};
use crate::config::Config;
use crate::db::create_pool;
use crate::queue::{run_worker, RedisQueue};
use crate::reports::pipeline::ReportPipeline;
use crate::reports::store::PgStore;
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let queue = RedisQueue::connect(redis).await?;

    // Initialize providers: Groq primary, Gemini secondary
    let groq: Arc<dyn AiProvider> = Arc::new(GroqProvider::new(config.groq_api_key.clone())?);
    let gemini: Arc<dyn AiProvider> =
        Arc::new(GeminiProvider::new(config.gemini_api_key.clone())?);
    if !gemini.has_credentials() {
        info!("GEMINI_API_KEY not set; fallback provider unavailable");
    }
    let ai = Arc::new(GenerationService::new(
        groq,
        Some(gemini),
        config.disable_fallback,
    ));
    info!(
        "Generation service initialized (primary: {}, fallback disabled: {})",
        ai.primary_kind(),
        config.disable_fallback
    );

    // Start the analysis worker
    let pipeline = Arc::new(ReportPipeline::new(
        ai.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let consumer = queue.consumer().await?;
    tokio::spawn(run_worker(consumer, pipeline, config.analysis_workers));

    // Build app state
    let state = AppState {
        ai,
        results: store,
        queue: Arc::new(queue),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
