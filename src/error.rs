//! # Error handling
//!
//! Every failure in notebox is scoped to the request that triggered it.
//! Nothing is retried; errors are returned to the caller, and handlers turn
//! them into a JSON body of the form
//! `{ "error": { "code": "...", "message": "..." } }`.
//!
//! - `AppError`: the error type used by services and route handlers
//! - `IntoResponse` for `AppError`: status code and body mapping

use crate::backend::BackendError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the repository, the credential gate and the editor.
#[derive(Debug, Error)]
pub enum AppError {
    /// No session when one is required (HTTP 401).
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Empty title, password policy violation, missing password (HTTP 400).
    #[error("{0}")]
    Validation(String),

    /// Failed or cancelled password challenge (HTTP 403).
    #[error("{0}")]
    AccessDenied(String),

    /// The requested note or folder is not visible to this session (HTTP 404).
    #[error("Resource not found")]
    NotFound,

    /// Any backend call failure. The backend's message is kept verbatim.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl IntoResponse for AppError {
    /// Internal details (database and storage errors) are logged and
    /// replaced by a generic client message.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "not_authenticated", self.to_string())
            }
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::AccessDenied(ref msg) => {
                (StatusCode::FORBIDDEN, "access_denied", msg.clone())
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Backend(ref e) => match e {
                BackendError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "backend_error", msg.clone())
                }
                BackendError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "backend_error", msg.clone())
                }
                BackendError::Rejected(msg) => (StatusCode::BAD_GATEWAY, "backend_error", msg.clone()),
                BackendError::Database(err) => {
                    tracing::error!("Database error: {}", err);
                    (
                        StatusCode::BAD_GATEWAY,
                        "backend_error",
                        "A database error occurred".to_string(),
                    )
                }
                BackendError::Storage(err) => {
                    tracing::error!("Storage error: {}", err);
                    (
                        StatusCode::BAD_GATEWAY,
                        "backend_error",
                        "A storage error occurred".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
