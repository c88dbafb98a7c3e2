//! Render Job Service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use std::sync::Arc;

use render_job_service::{app, config, db, state::AppState, store::postgres::PgRenderStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controls verbosity, "info" by default
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "Database pool created"
    );

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let state = AppState::new(Arc::new(PgRenderStore::new(pool)));
    let app = app(state, &config);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Requests are served concurrently on the tokio runtime
    axum::serve(listener, app).await?;

    Ok(())
}
