mod airphynet;
mod analytics;
mod api;
mod config;
mod db;

use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{airphynet::AirphynetClient, api::AppState, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent — env vars may be set externally)
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config; resolve the bucketing timezone up front so a bad offset
    // fails at startup, not per request.
    let config = Config::from_env()?;
    let trend_tz = config.trend_timezone()?;

    // Connect to DB and run migrations
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database ready");

    // Build the shared prediction-service client
    let airphynet = AirphynetClient::new(&config)?;
    if config.airphynet_api_url.is_none() {
        info!("AIRPHYNET_API_URL not set; forecasts will be unavailable");
    }

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState {
        pool,
        config: Arc::new(config),
        airphynet,
        trend_tz,
    };

    // Start HTTP server
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
