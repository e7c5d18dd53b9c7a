//! # Configuration
//!
//! Server settings read once at startup from the environment (a `.env`
//! file is loaded first by `main`).
//!
//! - `DATABASE_URL`: SQLite database (required)
//! - `JWT_SECRET`: session token signing key (required)
//! - `UPLOADS_PATH`: attachment blob directory
//! - `HOST`, `PORT`: listen address
//! - `PUBLIC_BASE_URL`: prefix of attachment URLs handed to clients
//! - `SESSION_TTL_MINUTES`: lifetime of a backend session

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// e.g. `sqlite:data/notebox.db?mode=rwc`
    pub database_url: String,
    pub jwt_secret: String,
    pub uploads_path: String,
    pub host: String,
    pub port: u16,
    /// Without a trailing slash.
    pub public_base_url: String,
    pub session_ttl_minutes: i64,
}

impl Config {
    /// Fails only when `DATABASE_URL` or `JWT_SECRET` is missing; every other
    /// setting falls back to its default.
    pub fn from_env() -> Result<Self, env::VarError> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            uploads_path: env::var("UPLOADS_PATH").unwrap_or_else(|_| "data/uploads".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            session_ttl_minutes: env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .filter(|m| *m > 0)
                .unwrap_or(60),
        })
    }
}
