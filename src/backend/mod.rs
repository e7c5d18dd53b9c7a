//! # Backend client
//!
//! Everything durable (accounts, sessions, notes, folders, blobs) lives
//! behind the [`Backend`] trait. The rest of the crate only talks to this
//! trait, so a hosted service can replace the bundled [`SqliteBackend`]
//! without touching the repository, the session gate or the routes.
//!
//! - `sqlite`: the bundled implementation over sqlx
//! - `storage`: on-disk blob store used by `SqliteBackend`
//! - `token`: HS256 session tokens

pub mod sqlite;
pub mod storage;
pub mod token;

pub use sqlite::SqliteBackend;

use crate::models::{Folder, Note, NoteFormData, Session};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

/// Failures reported by the backend. Messages of the client-facing variants
/// are passed to the caller unchanged.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Rejected(String),
}

/// The remote service as seen by notebox.
///
/// Row-level scoping is the backend's job: every table operation takes the
/// id of the session user and only touches that user's rows.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The current session, or `None` when signed out or expired.
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;

    /// A receiver that observes every session change for as long as it is held.
    fn on_session_change(&self) -> watch::Receiver<Option<Session>>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<Session, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// `select * from notes [where folder_id = ?] order by created_at desc`
    async fn select_notes(
        &self,
        user_id: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<Note>, BackendError>;

    async fn insert_note(&self, user_id: &str, note: &NoteFormData) -> Result<Note, BackendError>;

    async fn update_note(
        &self,
        user_id: &str,
        id: &str,
        note: &NoteFormData,
    ) -> Result<Note, BackendError>;

    async fn delete_note(&self, user_id: &str, id: &str) -> Result<(), BackendError>;

    /// `select * from folders order by name asc`
    async fn select_folders(&self, user_id: &str) -> Result<Vec<Folder>, BackendError>;

    async fn insert_folder(&self, user_id: &str, name: &str) -> Result<Folder, BackendError>;

    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), BackendError>;

    fn public_url(&self, path: &str) -> String;
}
