use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::AppState;

/// Authenticated caller, injected into request extensions by [`token_gate`]
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub claims: Value,
}

impl AuthUser {
    /// Name recorded as a note's author
    pub fn display_name(&self) -> &str {
        self.email.as_deref().filter(|e| !e.is_empty()).unwrap_or(&self.uid)
    }
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            uid: identity.uid,
            email: identity.email,
            claims: identity.claims,
        }
    }
}

/// Token gate: verifies the bearer header or session cookie with the identity
/// provider before the wrapped handler runs. Any failure is a 403.
pub async fn token_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), &state.session_cookie).ok_or_else(|| {
        tracing::warn!(
            "Rejected {} {}: no bearer token or session cookie",
            request.method(),
            request.uri().path()
        );
        ApiError::unauthorized()
    })?;

    let identity = state.identity.verify_token(&token).await.map_err(|e| {
        tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::unauthorized()
    })?;

    tracing::debug!("Authenticated {} for {}", identity.uid, request.uri().path());
    request.extensions_mut().insert(AuthUser::from(identity));

    Ok(next.run(request).await)
}

/// `Authorization: Bearer <token>` wins over the session cookie. A header
/// with any other scheme is ignored rather than rejected.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers).or_else(|| session_cookie(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
