//! puzzle-tracker server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints and the static
//! `/uploads` directory.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use puzzle_tracker::api;
use puzzle_tracker::app_state::AppState;
use puzzle_tracker::config::{LogFormat, ServerConfig};
use puzzle_tracker::domain::SystemClock;
use puzzle_tracker::persistence::{
    MemoryPuzzleRepository, PostgresPuzzleRepository, PuzzleRepository, postgres,
};
use puzzle_tracker::service::PuzzleService;
use puzzle_tracker::storage::FsImageStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting puzzle-tracker");

    // Build persistence layer
    let repository: Arc<dyn PuzzleRepository> = if config.persistence_enabled {
        let pool = postgres::connect(&config)
            .await
            .context("initializing database")?;
        postgres::migrate(&pool)
            .await
            .context("migrating database")?;
        Arc::new(PostgresPuzzleRepository::new(pool))
    } else {
        tracing::warn!("persistence disabled; puzzles are kept in memory only");
        Arc::new(MemoryPuzzleRepository::new())
    };

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating {}", config.upload_dir.display()))?;
    let images = Arc::new(FsImageStore::new(&config.upload_dir));

    // Build service layer
    let puzzle_service = Arc::new(PuzzleService::new(
        repository,
        images,
        Arc::new(SystemClock),
    ));

    // Build router
    let app_state = AppState { puzzle_service };
    let app = api::build_app(app_state, &api::HttpSettings::from(&config));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
