//! Admin login endpoints.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use super::{ApiResult, SharedState, extract::JsonBody};
use crate::core::auth;

/// Login body. Fields are optional so that a missing one is a field error, not a
/// rejected body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `POST /api/auth/login`
pub async fn login_handler(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::verify_login(
        &state.admin,
        payload.email.as_deref().unwrap_or_default(),
        payload.password.as_deref().unwrap_or_default(),
    )?;
    Ok(Json(json!({
        "message": "Login successful",
        "user": user,
    })))
}

/// `POST /api/auth/logout`. Sessions are client-side, so there is nothing to revoke.
pub async fn logout_handler() -> impl IntoResponse {
    Json(json!({ "message": "Logged out" }))
}
