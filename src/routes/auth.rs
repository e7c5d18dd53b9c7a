//! # Auth routes
//!
//! - `GET  /api/v1/auth/session`          → gate state and backend user
//! - `POST /api/v1/auth/signup`           → create an account and sign in
//! - `POST /api/v1/auth/login`            → email/password sign in
//! - `POST /api/v1/auth/oauth/{provider}` → provider sign in
//! - `POST /api/v1/auth/developer`        → open the workspace without a
//!   backend session
//! - `POST /api/v1/auth/logout`           → close the workspace
//!
//! Every successful sign in is followed by a gate login, which settles on
//! real access because the backend now has a session.

use crate::{error::AppError, models::*, routes::notes::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

async fn session_response(state: &AppState) -> Result<Json<SessionResponse>, AppError> {
    let session = state.backend.get_session().await?;
    Ok(Json(SessionResponse {
        is_authenticated: state.gate.is_authenticated(),
        is_developer_access: state.gate.is_developer_access(),
        user: session.map(|s| s.user),
    }))
}

pub async fn current_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    session_response(&state).await
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    state.backend.sign_up(&req.email, &req.password).await?;
    state.gate.login().await?;
    Ok((StatusCode::CREATED, session_response(&state).await?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    state
        .backend
        .sign_in_with_password(&req.email, &req.password)
        .await?;
    state.gate.login().await?;
    session_response(&state).await
}

pub async fn oauth_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    state.backend.sign_in_with_oauth(&provider).await?;
    state.gate.login().await?;
    session_response(&state).await
}

/// Opens the workspace as-is: real access if the backend already has a
/// session, developer access otherwise.
pub async fn developer_login(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    state.gate.login().await?;
    session_response(&state).await
}

/// Closes the gate and drops the cached notes, so the next sign in starts
/// from a fresh fetch.
pub async fn logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.gate.logout().await?;
    state.notes.invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}
