#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use ats_api::config::AppConfig;
use ats_api::{app, AppState};

pub const PREFIX: &str = "/api/v1";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Base URL plus the API prefix, e.g. `http://127.0.0.1:4567/api/v1/postings`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, PREFIX, path)
    }

    /// Creates an account and logs in, returning the login payload
    pub async fn login_as(&self, email: &str, password: &str) -> Result<Value> {
        let creds = json!({ "email": email, "password": password });

        let res = self.client.post(self.url("/signup")).json(&creds).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "signup failed: {}", res.status());

        let res = self.client.post(self.url("/login")).json(&creds).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        Ok(res.json().await?)
    }

    /// Signs up a fresh account and returns its ID token
    pub async fn token(&self) -> Result<String> {
        let email = format!("recruiter-{}@example.com", self.port);
        let login = self.login_as(&email, "correct-horse").await?;
        login["idToken"]
            .as_str()
            .map(str::to_string)
            .context("login payload carried no idToken")
    }
}

/// Serves the app with in-memory backends on an unused port.
///
/// Each tokio test has its own runtime, so every test gets its own server.
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let mut config: AppConfig = AppConfig::from_env();
    config.api.path_prefix = PREFIX.to_string();
    config.api.enable_request_logging = false;
    config.security.session_cookie = "__session".to_string();

    let router = app(AppState::in_memory(), &config);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer { port, base_url, client: reqwest::Client::new() })
}
