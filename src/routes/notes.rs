//! # Note routes
//!
//! - `GET    /api/v1/notes`             → notes of the session user, filtered
//! - `POST   /api/v1/notes`             → create from the editor form
//! - `PUT    /api/v1/notes/{id}`        → update from the editor form
//! - `DELETE /api/v1/notes/{id}`        → delete
//! - `POST   /api/v1/notes/{id}/unlock` → full note after a password check
//!
//! Every handler takes [`WorkspaceAccess`], so a closed workspace answers
//! `401` before any backend call. Developer access opens the workspace but
//! carries no backend identity; the repository then reports
//! `not_authenticated` itself.

use crate::{
    backend::Backend,
    error::AppError,
    middleware::WorkspaceAccess,
    models::*,
    services::{
        credential::{check_access, SuppliedPassword, TracingNotifier},
        editor::{self, INCORRECT_PASSWORD},
        notes::{distinct_tags, NoteRepository},
        session::{SessionGate, SessionSubscription},
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared by every handler through `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub notes: Arc<NoteRepository>,
    pub gate: Arc<SessionGate>,
    /// Keeps the gate following backend session changes.
    _subscription: Arc<SessionSubscription>,
}

impl AppState {
    /// Must be called inside a Tokio runtime: the gate's listener is spawned
    /// here.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let gate = Arc::new(SessionGate::new(Arc::clone(&backend)));
        let subscription = gate.listen();
        Self {
            notes: Arc::new(NoteRepository::new(Arc::clone(&backend))),
            backend,
            gate,
            _subscription: Arc::new(subscription),
        }
    }

    pub async fn require_session(&self) -> Result<Session, AppError> {
        self.backend
            .get_session()
            .await?
            .ok_or(AppError::NotAuthenticated)
    }
}

/// `GET /notes?folder_id=&tag=&search=`
///
/// Responds with `{ "notes": [...], "tags": [...] }`, `tags` being the tags
/// used by the returned notes.
pub async fn list_notes(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
    Query(filter): Query<NoteFilter>,
) -> Result<Json<Value>, AppError> {
    let notes = state.notes.list(&filter).await?;
    let tags = distinct_tags(&notes);
    let notes: Vec<NoteResponse> = notes.iter().map(NoteResponse::listed).collect();
    Ok(Json(json!({ "notes": notes, "tags": tags })))
}

pub async fn create_note(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
    Json(req): Json<NoteEditorRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), AppError> {
    let form = editor::prepare_save(req, None, &TracingNotifier).await?;
    let note = state.notes.save(form).await?;
    Ok((StatusCode::CREATED, Json(NoteResponse::unlocked(&note))))
}

/// Editing a protected note needs `current_password` in the body.
pub async fn update_note(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NoteEditorRequest>,
) -> Result<Json<NoteResponse>, AppError> {
    let existing = state.notes.get(&id).await?;
    let form = editor::prepare_save(req, Some(&existing), &TracingNotifier).await?;
    let note = state.notes.save(form).await?;
    Ok(Json(NoteResponse::unlocked(&note)))
}

pub async fn delete_note(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.notes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /notes/{id}/unlock` with `{ "password": "..." }`.
pub async fn unlock_note(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UnlockNoteRequest>,
) -> Result<Json<NoteResponse>, AppError> {
    let note = state.notes.get(&id).await?;
    let prompt = SuppliedPassword(req.password);
    if !check_access(&note, &prompt, &TracingNotifier).await {
        return Err(AppError::AccessDenied(INCORRECT_PASSWORD.to_string()));
    }
    Ok(Json(NoteResponse::unlocked(&note)))
}
