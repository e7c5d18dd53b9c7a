use crate::services::credential::{validate_strength, StrengthReport};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StrengthRequest {
    pub password: String,
}

/// `POST /password/strength`. Always `200`; the verdict is in the body.
pub async fn check_strength(Json(req): Json<StrengthRequest>) -> Json<StrengthReport> {
    Json(validate_strength(&req.password))
}
