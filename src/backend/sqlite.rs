//! # Bundled SQLite backend
//!
//! Implements [`Backend`] over a sqlx pool, a [`FileStore`] and a single
//! current session.
//!
//! - Accounts: Argon2id password hashes in the `users` table
//! - Sessions: an HS256 token held in a `watch` channel; every change is
//!   broadcast to `on_session_change` subscribers
//! - Tables: `notes` and `folders`, scoped by the session user
//! - Blobs: files under the upload root

use super::{
    storage::FileStore,
    token::{create_session_token, verify_session_token},
    Backend, BackendError,
};
use crate::{db, models::*};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use sqlx::SqlitePool;
use tokio::sync::watch;

const INVALID_LOGIN: &str = "Invalid login credentials";
const MIN_ACCOUNT_PASSWORD_LENGTH: usize = 8;

pub struct SqliteBackend {
    pool: SqlitePool,
    store: FileStore,
    jwt_secret: String,
    session_ttl: Duration,
    current: watch::Sender<Option<Session>>,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool, store: FileStore, jwt_secret: String, session_ttl: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            pool,
            store,
            jwt_secret,
            session_ttl,
            current,
        }
    }

    fn start_session(&self, user: SessionUser) -> Result<Session, BackendError> {
        let (access_token, expires_at) = create_session_token(&user, &self.jwt_secret, self.session_ttl)
            .map_err(|e| BackendError::Rejected(format!("Token generation failed: {}", e)))?;

        let session = Session {
            access_token,
            user,
            expires_at,
        };
        tracing::info!(user_id = %session.user.id, "session started");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// A folder id on a note must name one of the user's own folders.
    async fn check_folder(&self, user_id: &str, folder_id: Option<&str>) -> Result<(), BackendError> {
        if let Some(folder_id) = folder_id {
            if db::get_folder(&self.pool, user_id, folder_id).await?.is_none() {
                return Err(BackendError::Rejected(format!("Folder {} not found", folder_id)));
            }
        }
        Ok(())
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        let current = self.current.borrow().clone();
        let Some(session) = current else {
            return Ok(None);
        };

        match verify_session_token(&session.access_token, &self.jwt_secret) {
            Ok(_) => Ok(Some(session)),
            Err(reason) => {
                tracing::info!(user_id = %session.user.id, ?reason, "session dropped");
                self.current.send_replace(None);
                Ok(None)
            }
        }
    }

    fn on_session_change(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let user = db::users::find_by_email(&self.pool, email.trim())
            .await?
            .ok_or_else(|| BackendError::Unauthorized(INVALID_LOGIN.to_string()))?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| BackendError::Rejected(format!("Password hash parse error: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| BackendError::Unauthorized(INVALID_LOGIN.to_string()))?;

        self.start_session(user.into())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(BackendError::Rejected("Invalid email address".to_string()));
        }
        if password.chars().count() < MIN_ACCOUNT_PASSWORD_LENGTH {
            return Err(BackendError::Rejected(format!(
                "Password must be at least {} characters",
                MIN_ACCOUNT_PASSWORD_LENGTH
            )));
        }
        if db::users::find_by_email(&self.pool, email).await?.is_some() {
            return Err(BackendError::Rejected("Email already registered".to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| BackendError::Rejected(format!("Password hashing failed: {}", e)))?
            .to_string();

        let user_id = uuid::Uuid::now_v7().to_string();
        let user = db::users::create_user(&self.pool, &user_id, email, &password_hash)
            .await?
            .ok_or_else(|| BackendError::NotFound("Failed to retrieve created user".to_string()))?;

        tracing::info!(user_id = %user.id, "user registered");
        self.start_session(user.into())
    }

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<Session, BackendError> {
        Err(BackendError::Rejected(format!(
            "OAuth provider '{}' is not enabled",
            provider
        )))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if let Some(session) = self.current.send_replace(None) {
            tracing::info!(user_id = %session.user.id, "session ended");
        }
        Ok(())
    }

    async fn select_notes(
        &self,
        user_id: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<Note>, BackendError> {
        Ok(db::list_notes(&self.pool, user_id, folder_id).await?)
    }

    async fn insert_note(&self, user_id: &str, note: &NoteFormData) -> Result<Note, BackendError> {
        self.check_folder(user_id, note.folder_id.as_deref()).await?;

        let id = uuid::Uuid::now_v7().to_string();
        db::insert_note(&self.pool, &id, user_id, note, &now()).await?;

        db::get_note(&self.pool, user_id, &id)
            .await?
            .ok_or_else(|| BackendError::NotFound("Failed to retrieve created note".to_string()))
    }

    async fn update_note(
        &self,
        user_id: &str,
        id: &str,
        note: &NoteFormData,
    ) -> Result<Note, BackendError> {
        self.check_folder(user_id, note.folder_id.as_deref()).await?;

        if !db::update_note(&self.pool, user_id, id, note, &now()).await? {
            return Err(BackendError::NotFound(format!("Note {} not found", id)));
        }

        db::get_note(&self.pool, user_id, id)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("Note {} not found", id)))
    }

    async fn delete_note(&self, user_id: &str, id: &str) -> Result<(), BackendError> {
        if !db::delete_note(&self.pool, user_id, id).await? {
            return Err(BackendError::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }

    async fn select_folders(&self, user_id: &str) -> Result<Vec<Folder>, BackendError> {
        Ok(db::list_folders(&self.pool, user_id).await?)
    }

    async fn insert_folder(&self, user_id: &str, name: &str) -> Result<Folder, BackendError> {
        let id = uuid::Uuid::now_v7().to_string();
        db::create_folder(&self.pool, &id, user_id, name)
            .await?
            .ok_or_else(|| BackendError::NotFound("Failed to retrieve created folder".to_string()))
    }

    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), BackendError> {
        self.store.write(path, bytes).await?;
        tracing::debug!(path, size = bytes.len(), "blob stored");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.store.public_url(path)
    }
}
