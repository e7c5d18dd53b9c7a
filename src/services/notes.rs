//! # Note repository
//!
//! Fetches, filters and mutates notes through the [`Backend`], and keeps a
//! cache of the session user's notes.
//!
//! `list` always fetches the user's whole collection and filters it in
//! memory. That keeps the backend contract small and is fine for personal
//! collections; large collections should push filtering into the backend.
//!
//! The cache is only ever dropped, never patched: it is invalidated after
//! the backend has acknowledged a mutation, so the next `list` re-reads the
//! confirmed state. Each invalidation bumps a generation; a fetch that
//! started before the bump is returned to its caller but not cached.

use crate::{
    backend::Backend,
    error::AppError,
    models::{Note, NoteFilter, NoteFormData, Session},
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

struct CachedNotes {
    user_id: String,
    notes: Vec<Note>,
}

#[derive(Default)]
struct NoteCache {
    generation: u64,
    entry: Option<CachedNotes>,
}

pub struct NoteRepository {
    backend: Arc<dyn Backend>,
    cache: RwLock<NoteCache>,
}

impl NoteRepository {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(NoteCache::default()),
        }
    }

    async fn require_session(&self) -> Result<Session, AppError> {
        self.backend
            .get_session()
            .await?
            .ok_or(AppError::NotAuthenticated)
    }

    /// The session user's notes, newest first, narrowed by `filter`.
    pub async fn list(&self, filter: &NoteFilter) -> Result<Vec<Note>, AppError> {
        let session = self.require_session().await?;
        let notes = self.all_notes(&session.user.id).await?;
        Ok(notes.into_iter().filter(|n| filter.matches(n)).collect())
    }

    /// A single note of the session user.
    pub async fn get(&self, id: &str) -> Result<Note, AppError> {
        let session = self.require_session().await?;
        self.all_notes(&session.user.id)
            .await?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or(AppError::NotFound)
    }

    async fn all_notes(&self, user_id: &str) -> Result<Vec<Note>, AppError> {
        let generation = {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.entry.as_ref().filter(|c| c.user_id == user_id) {
                return Ok(cached.notes.clone());
            }
            cache.generation
        };

        let notes = self.backend.select_notes(user_id, None).await?;
        tracing::debug!(user_id, count = notes.len(), "notes fetched");

        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            cache.entry = Some(CachedNotes {
                user_id: user_id.to_string(),
                notes: notes.clone(),
            });
        } else {
            tracing::debug!(user_id, "cache invalidated during fetch, not storing");
        }
        Ok(notes)
    }

    /// Inserts (`form.id == None`) or updates a note.
    ///
    /// The title is not checked here; the editor validates it first.
    pub async fn save(&self, form: NoteFormData) -> Result<Note, AppError> {
        let session = self.require_session().await?;
        let user_id = session.user.id.as_str();

        let note = match form.id.as_deref() {
            Some(id) => self.backend.update_note(user_id, id, &form).await?,
            None => self.backend.insert_note(user_id, &form).await?,
        };

        self.invalidate().await;
        tracing::info!(note_id = %note.id, updated = form.id.is_some(), "note saved");
        Ok(note)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let session = self.require_session().await?;
        self.backend.delete_note(&session.user.id, id).await?;

        self.invalidate().await;
        tracing::info!(note_id = id, "note deleted");
        Ok(())
    }

    /// Drops the cached collection. Called after every acknowledged
    /// mutation and on sign-out.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        cache.generation += 1;
        cache.entry = None;
    }
}

/// Every tag in use across `notes`, without blanks or duplicates.
pub fn distinct_tags<'a, I>(notes: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Note>,
{
    notes
        .into_iter()
        .flat_map(|note| note.tags.iter())
        .filter(|tag| !tag.is_empty())
        .cloned()
        .collect()
}
