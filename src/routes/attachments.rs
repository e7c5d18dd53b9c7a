use crate::{
    error::AppError,
    middleware::WorkspaceAccess,
    routes::notes::AppState,
    services::attachments::{upload_attachment, AttachmentKind},
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub filename: Option<String>,
}

/// `POST /attachments/{photo|voice}?filename=...` with the raw file as body.
///
/// Responds `{ "url": "..." }`; the client puts the URL into the note's
/// `photo_url` or `voice_url`.
pub async fn upload(
    _access: WorkspaceAccess,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let kind: AttachmentKind = kind.parse()?;
    if body.is_empty() {
        return Err(AppError::Validation("Attachment is empty".to_string()));
    }

    let url = upload_attachment(
        state.backend.as_ref(),
        kind,
        params.filename.as_deref(),
        &body,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(json!({ "url": url }))))
}
