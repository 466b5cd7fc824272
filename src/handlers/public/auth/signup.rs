// handlers/public/auth/signup.rs - POST /signup handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use super::text;
use crate::error::{ApiError, ApiResult};
use crate::validation::validate_credentials;
use crate::AppState;

/// POST /signup - Create an account with the identity provider
///
/// Input: `{ "email": "string", "password": "string" }`
/// Output: `{ "id": "<uid>" }`
pub async fn signup_post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    validate_credentials(&body)?;

    let uid = state
        .identity
        .sign_up(text(&body, "email"), text(&body, "password"))
        .await
        .map_err(|e| ApiError::context("An error has occured when signing up.", e))?;

    tracing::info!("Created account {}", uid);
    Ok(Json(json!({ "id": uid })))
}
