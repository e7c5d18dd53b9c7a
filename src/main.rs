//! # notebox server entry point
//!
//! 1. Load `.env`
//! 2. Initialize tracing
//! 3. Open the database and run migrations
//! 4. Create the upload directory
//! 5. Build the backend, the session gate and the router
//! 6. Serve

use anyhow::Result;
use notebox::{
    backend::{storage::FileStore, SqliteBackend},
    build_router,
    config::Config,
    open_pool, AppState,
};
use std::{path::Path, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notebox=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting notebox server on {}:{}", config.host, config.port);

    let pool = open_pool(&config.database_url, 5).await?;

    let uploads_path = Path::new(&config.uploads_path);
    if !uploads_path.exists() {
        tokio::fs::create_dir_all(uploads_path).await?;
        tracing::info!("Created uploads directory: {}", config.uploads_path);
    }

    let backend = SqliteBackend::new(
        pool,
        FileStore::new(uploads_path, &config.public_base_url),
        config.jwt_secret.clone(),
        chrono::Duration::minutes(config.session_ttl_minutes),
    );
    let state = AppState::new(Arc::new(backend));
    let restored = state.gate.initialize().await?;
    tracing::debug!(?restored, "session gate initialized");

    let app = build_router(state, uploads_path);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
