use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, routes::notes::AppState};

/// Admits a request only while the workspace is open (real session or
/// developer access).
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceAccess;

impl FromRequestParts<AppState> for WorkspaceAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.gate.is_authenticated() {
            return Err(AppError::NotAuthenticated);
        }
        Ok(WorkspaceAccess)
    }
}
