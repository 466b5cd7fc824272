use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod store;
pub mod types;
pub mod validation;

use config::AppConfig;
use identity::{IdentityProvider, MemoryIdentity};
use store::{DocumentStore, MemoryDocumentStore};

/// Handles shared by every request. Nothing here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Cookie the token gate reads when no bearer header is sent
    pub session_cookie: String,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            session_cookie: "__session".to_string(),
        }
    }

    /// In-process store and identity provider
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDocumentStore::new()), Arc::new(MemoryIdentity::new()))
    }

    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let api = Router::new()
        // Public auth routes
        .merge(auth_public_routes())
        // Token-gated resources
        .merge(resource_routes(state.clone()));

    let prefix = crate::config::normalize_prefix(&config.api.path_prefix);
    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health));
    router = if prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(&prefix, api)
    };

    let mut router = router
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    // Global middleware
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/signup", post(auth::signup_post))
        .route("/login", post(auth::login_post))
        .route("/refreshIdToken", post(auth::refresh_post))
}

fn resource_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{candidates, notes, postings};

    Router::new()
        .route("/postings", get(postings::list).post(postings::post))
        .route(
            "/postings/:id",
            get(postings::get).put(postings::put).delete(postings::delete),
        )
        .route("/candidates", get(candidates::list).post(candidates::post))
        .route(
            "/candidates/:id",
            get(candidates::get).put(candidates::put).delete(candidates::delete),
        )
        .route("/candidates/:id/notes", get(notes::list).post(notes::post))
        .route(
            "/candidates/:id/notes/:note_id",
            axum::routing::put(notes::put).delete(notes::delete),
        )
        // Only matched routes pass through the gate; unknown paths stay 404
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            crate::middleware::token_gate,
        ))
}

// An empty origin list reflects any origin, like a permissive dev setup
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| !o.is_empty())
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let prefix = &config::config().api.path_prefix;

    Json(json!({
        "name": "ATS API",
        "version": version,
        "endpoints": {
            "auth": format!("{0}/signup, {0}/login, {0}/refreshIdToken (public)", prefix),
            "postings": format!("{}/postings[/:id] (token)", prefix),
            "candidates": format!("{}/candidates[/:id] (token)", prefix),
            "notes": format!("{}/candidates/:id/notes[/:noteId] (token)", prefix),
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "store": "ok" })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "message": format!("store unavailable: {}", e),
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn test_config(prefix: &str) -> AppConfig {
        let mut config = AppConfig::from_env();
        config.api.path_prefix = prefix.to_string();
        config.api.enable_request_logging = false;
        config
    }

    async fn status_of(router: Router, method: Method, uri: &str) -> StatusCode {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn gate_only_covers_known_routes() {
        let router = app(AppState::in_memory(), &test_config("/api/v1"));
        assert_eq!(status_of(router.clone(), Method::GET, "/api/v1/postings").await, StatusCode::FORBIDDEN);
        assert_eq!(status_of(router.clone(), Method::GET, "/api/v1/nowhere").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of(router, Method::GET, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_prefix_mounts_at_root() {
        let router = app(AppState::in_memory(), &test_config(""));
        assert_eq!(status_of(router.clone(), Method::GET, "/candidates").await, StatusCode::FORBIDDEN);
        assert_eq!(status_of(router, Method::GET, "/api/v1/candidates").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn auth_routes_skip_the_gate() {
        let router = app(AppState::in_memory(), &test_config("/api/v1"));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"a@example.com"}"#))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Input is invalid. Password cannot be empty");
    }
}
