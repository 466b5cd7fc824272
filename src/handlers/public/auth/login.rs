// handlers/public/auth/login.rs - POST /login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use super::text;
use crate::error::{ApiError, ApiResult};
use crate::validation::validate_credentials;
use crate::AppState;

/// POST /login - Password sign-in
///
/// Input: `{ "email": "string", "password": "string" }`
///
/// Output is the identity provider's sign-in payload as-is, e.g.
/// ```json
/// { "localId": "...", "email": "...", "idToken": "...", "refreshToken": "...", "expiresIn": "3600" }
/// ```
pub async fn login_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    validate_credentials(&body)?;

    let payload = state
        .identity
        .sign_in(text(&body, "email"), text(&body, "password"))
        .await
        .map_err(|e| {
            tracing::warn!("Sign-in failed: {}", e);
            ApiError::context("An error has occured when logging in.", e)
        })?;

    Ok(Json(payload))
}
