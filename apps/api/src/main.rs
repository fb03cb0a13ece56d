mod config;
mod db;
mod errors;
mod gateways;
mod llm_client;
mod models;
mod routes;
mod state;
mod taskgen;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::gateways::analytics::PgAnalyticsGateway;
use crate::gateways::project::PgProjectGateway;
use crate::gateways::tasks::PgTaskStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::taskgen::agent::TaskGenerationAgent;
use crate::taskgen::service::TaskGeneratorService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MarketScout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Wire the task generation pipeline: Postgres-backed gateways behind
    // trait objects, agent on top of the shared model client.
    let agent = TaskGenerationAgent::new(Arc::new(llm));
    let task_generator = Arc::new(TaskGeneratorService::new(
        Arc::new(PgAnalyticsGateway::new(db.clone())),
        Arc::new(PgProjectGateway::new(db.clone())),
        Arc::new(PgTaskStore::new(db.clone())),
        agent,
    ));
    info!("Task generator service initialized");

    // Build app state
    let state = AppState { task_generator };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
