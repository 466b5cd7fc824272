// handlers/public/auth/refresh.rs - POST /refreshIdToken handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use super::text;
use crate::error::{ApiError, ApiResult};
use crate::validation::validate_refresh;
use crate::AppState;

/// POST /refreshIdToken - Exchange a refresh token for a new ID token
///
/// Input: `{ "refresh_token": "string" }`
/// Output: the identity provider's refresh payload as-is.
pub async fn refresh_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    validate_refresh(&body)?;

    let payload = state
        .identity
        .refresh(text(&body, "refresh_token"))
        .await
        .map_err(|e| ApiError::context("An error has occured when refreshing the token.", e))?;

    Ok(Json(payload))
}
