use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ats_api::config::{self, AppConfig, IdentityProviderKind};
use ats_api::identity::{FirebaseIdentity, IdentityProvider, MemoryIdentity};
use ats_api::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use ats_api::{app, is_production, AppState};

#[derive(Debug, Parser)]
#[command(name = "ats-api", about = "Applicant tracking API server")]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Interface to bind
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, FIREBASE_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = config::config();
    tracing::info!("Starting ATS API in {:?} mode", config.environment);

    let (store, pg_store) = build_store(config).await?;
    let identity = build_identity(config)?;
    let state = AppState::new(store, identity).with_session_cookie(config.security.session_cookie.clone());

    let bind_addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("ATS API listening on http://{}{}", bind_addr, config.api.path_prefix);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pg) = pg_store {
        pg.close().await;
    }
    Ok(())
}

async fn build_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn DocumentStore>, Option<Arc<PgDocumentStore>>)> {
    if config.database.url.is_some() {
        let pg = Arc::new(
            PgDocumentStore::connect(&config.database)
                .await
                .context("failed to connect document store")?,
        );
        let store: Arc<dyn DocumentStore> = pg.clone();
        return Ok((store, Some(pg)));
    }

    if is_production!() {
        anyhow::bail!("DATABASE_URL is required in production");
    }
    tracing::warn!("DATABASE_URL not set; documents are kept in memory and lost on restart");
    Ok((Arc::new(MemoryDocumentStore::new()), None))
}

fn build_identity(config: &AppConfig) -> anyhow::Result<Arc<dyn IdentityProvider>> {
    match config.identity.provider {
        IdentityProviderKind::Firebase => {
            let provider = FirebaseIdentity::from_config(&config.identity)
                .context("failed to configure identity provider")?;
            Ok(Arc::new(provider))
        }
        IdentityProviderKind::Memory => {
            if is_production!() {
                anyhow::bail!("the in-memory identity provider cannot run in production");
            }
            tracing::warn!("Using in-memory identity provider; accounts are lost on restart");
            Ok(Arc::new(MemoryIdentity::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
