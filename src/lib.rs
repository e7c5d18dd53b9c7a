//! # notebox
//!
//! A personal note service: notes with folders, tags, search, photo and
//! voice attachments, and optional per-note password protection.
//!
//! Layers, outermost first:
//! - `routes`: the HTTP API under `/api/v1`, gated by `middleware`
//! - `services`: the note repository, the editor, credentials, the session
//!   gate and attachments
//! - `backend`: the [`backend::Backend`] trait and the bundled SQLite
//!   implementation (`db` holds its queries)

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use routes::{attachments, auth, password, *};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{path::Path, str::FromStr};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use routes::notes::AppState;

/// Upper bound for a single photo or voice upload.
pub const MAX_ATTACHMENT_BYTES: usize = 25 * 1024 * 1024;

/// Opens the database (creating the file if needed) and applies pending
/// migrations.
pub async fn open_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        // An in-memory database lives only as long as its connection.
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// The full application: API under `/api/v1`, uploaded blobs under `/files`.
pub fn build_router(state: AppState, uploads_path: impl AsRef<Path>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/session", get(auth::current_session))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/oauth/{provider}", post(auth::oauth_login))
        .route("/auth/developer", post(auth::developer_login))
        .route("/auth/logout", post(auth::logout));

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", put(update_note).delete(delete_note))
        .route("/notes/{id}/unlock", post(unlock_note))
        .route("/tags", get(list_tags))
        .route("/folders", get(list_folders).post(create_folder))
        .route(
            "/attachments/{kind}",
            post(attachments::upload).layer(DefaultBodyLimit::max(MAX_ATTACHMENT_BYTES)),
        )
        .route("/password/strength", post(password::check_strength))
        .route("/health", get(health_check))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest_service("/files", ServeDir::new(uploads_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
