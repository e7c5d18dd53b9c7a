//! # Folder routes
//!
//! - `GET  /api/v1/folders` → the user's folders, by name
//! - `POST /api/v1/folders` → create `{ "name": "..." }`
//!
//! Deleting a folder is not offered; notes referencing a removed folder
//! fall back to no folder at the database level.

use crate::{
    error::AppError, middleware::WorkspaceAccess, models::*, routes::notes::AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn list_folders(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let session = state.require_session().await?;
    let folders = state.backend.select_folders(&session.user.id).await?;
    Ok(Json(json!({ "folders": folders })))
}

pub async fn create_folder(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<Folder>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Folder name is required".to_string()));
    }

    let session = state.require_session().await?;
    let folder = state.backend.insert_folder(&session.user.id, name).await?;
    tracing::info!(folder_id = %folder.id, "folder created");
    Ok((StatusCode::CREATED, Json(folder)))
}
