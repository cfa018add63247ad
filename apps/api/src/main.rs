mod config;
mod db;
mod document;
mod editor;
mod errors;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::editor::memory_store::MemoryStore;
use crate::editor::pg_store::PgResumeStore;
use crate::editor::session::SessionRegistry;
use crate::editor::store::ResumeStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.db_max_connections).await?;
            Arc::new(PgResumeStore::new(pool))
        }
        None => match &config.seed_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read SEED_FILE {path}"))?;
                let store = MemoryStore::from_seed_json(&json)
                    .with_context(|| format!("invalid SEED_FILE {path}"))?;
                warn!(
                    "DATABASE_URL not set; using in-memory store seeded from {path} \
                     (nothing will persist)"
                );
                Arc::new(store)
            }
            None => {
                warn!(
                    "DATABASE_URL and SEED_FILE not set; in-memory store is empty, \
                     so every /api/v1/resumes route will return 404"
                );
                Arc::new(MemoryStore::new())
            }
        },
    };

    let state = AppState {
        store,
        sessions: SessionRegistry::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor's deploy domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
