mod config;
mod errors;
mod extract;
mod google;
mod llm_client;
mod matching;
mod models;
mod routes;
mod sales_log;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::google::auth::ServiceAccount;
use crate::google::GoogleClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sales_log::SalesLog;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AI matching service v{}", env!("CARGO_PKG_VERSION"));

    // Service account is read once; never reloaded while running
    let account = ServiceAccount::from_file(&config.google_service_account_file)?;
    info!("Service account loaded ({})", account.client_email);
    let google = GoogleClient::new(account).context("Failed to build Google API client")?;

    let llm = LlmClient::new(config.openai_api_key.clone())
        .context("Failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let sales_log = SalesLog::new(&config.sales_log_path);
    info!("Sales log at {}", sales_log.path().display());

    let state = AppState {
        config: config.clone(),
        corpus: Arc::new(google),
        llm: Arc::new(llm),
        sales_log,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
