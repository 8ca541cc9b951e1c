mod config;
mod errors;
mod mcp;
mod occupations;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::occupations::careeronestop::CareerOneStopClient;
use crate::occupations::onet::OnetClient;
use crate::occupations::search::OccupationSearch;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting O*NET translation service v{}", env!("CARGO_PKG_VERSION"));
    config.warn_missing_secrets();

    let primary = CareerOneStopClient::new(&config)?;
    let fallback = OnetClient::new(&config)?;
    info!(
        "Provider clients initialized (timeout: {}s)",
        config.provider_timeout.as_secs()
    );

    let state = AppState {
        search: OccupationSearch::new(Arc::new(primary), Arc::new(fallback)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
