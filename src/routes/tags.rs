use crate::{
    error::AppError, middleware::WorkspaceAccess, models::NoteFilter,
    routes::notes::AppState, services::notes::distinct_tags,
};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /tags`: every tag in use across the user's notes, sorted.
pub async fn list_tags(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let notes = state.notes.list(&NoteFilter::default()).await?;
    Ok(Json(json!({ "tags": distinct_tags(&notes) })))
}
