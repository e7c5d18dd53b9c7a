#![allow(dead_code)]

use async_trait::async_trait;
use notebox::{
    backend::{storage::FileStore, Backend, BackendError, SqliteBackend},
    models::{Folder, Note, NoteFormData, Session},
    open_pool,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tempfile::TempDir;
use tokio::sync::{watch, Notify};

pub const BASE_URL: &str = "http://localhost:3000";

pub async fn sqlite_backend(ttl: chrono::Duration) -> (Arc<SqliteBackend>, TempDir) {
    let pool = open_pool("sqlite::memory:", 1).await.unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let backend = SqliteBackend::new(
        pool,
        FileStore::new(uploads.path(), BASE_URL),
        "test-secret".to_string(),
        ttl,
    );
    (Arc::new(backend), uploads)
}

/// Forwards to a [`SqliteBackend`], with switches to hold a note fetch
/// open and to make session lookups fail.
pub struct ControlledBackend {
    pub inner: Arc<SqliteBackend>,
    hold_next_fetch: AtomicBool,
    fetch_started: Notify,
    fetch_release: Notify,
    fail_session: AtomicBool,
}

impl ControlledBackend {
    pub fn new(inner: Arc<SqliteBackend>) -> Self {
        Self {
            inner,
            hold_next_fetch: AtomicBool::new(false),
            fetch_started: Notify::new(),
            fetch_release: Notify::new(),
            fail_session: AtomicBool::new(false),
        }
    }

    /// The next `select_notes` reads its rows, then waits for
    /// [`release_fetch`](Self::release_fetch) before returning them.
    pub fn hold_next_fetch(&self) {
        self.hold_next_fetch.store(true, Ordering::SeqCst);
    }

    pub async fn fetch_started(&self) {
        self.fetch_started.notified().await;
    }

    pub fn release_fetch(&self) {
        self.fetch_release.notify_one();
    }

    pub fn fail_session_lookups(&self, fail: bool) {
        self.fail_session.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for ControlledBackend {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        if self.fail_session.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected("Backend unavailable".to_string()));
        }
        self.inner.get_session().await
    }

    fn on_session_change(&self) -> watch::Receiver<Option<Session>> {
        self.inner.on_session_change()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        self.inner.sign_in_with_password(email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.inner.sign_up(email, password).await
    }

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<Session, BackendError> {
        self.inner.sign_in_with_oauth(provider).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.inner.sign_out().await
    }

    async fn select_notes(
        &self,
        user_id: &str,
        folder_id: Option<&str>,
    ) -> Result<Vec<Note>, BackendError> {
        let notes = self.inner.select_notes(user_id, folder_id).await;
        if self.hold_next_fetch.swap(false, Ordering::SeqCst) {
            self.fetch_started.notify_one();
            self.fetch_release.notified().await;
        }
        notes
    }

    async fn insert_note(&self, user_id: &str, note: &NoteFormData) -> Result<Note, BackendError> {
        self.inner.insert_note(user_id, note).await
    }

    async fn update_note(
        &self,
        user_id: &str,
        id: &str,
        note: &NoteFormData,
    ) -> Result<Note, BackendError> {
        self.inner.update_note(user_id, id, note).await
    }

    async fn delete_note(&self, user_id: &str, id: &str) -> Result<(), BackendError> {
        self.inner.delete_note(user_id, id).await
    }

    async fn select_folders(&self, user_id: &str) -> Result<Vec<Folder>, BackendError> {
        self.inner.select_folders(user_id).await
    }

    async fn insert_folder(&self, user_id: &str, name: &str) -> Result<Folder, BackendError> {
        self.inner.insert_folder(user_id, name).await
    }

    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), BackendError> {
        self.inner.upload(path, bytes).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }
}
