//! Main Entrypoint for the Interpreter Relay API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Building the upstream realtime client and the session broker.
//! 4. Constructing the Axum router.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use interpreter_api::{config::Config, router::create_router, state::AppState};
use interpreter_core::{OpenAIRealtimeClient, RealtimeUpstream, SessionBroker};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Upstream Client and Broker ---
    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let upstream: Arc<dyn RealtimeUpstream> = Arc::new(
        OpenAIRealtimeClient::new(http, config.openai_api_key.clone())
            .with_api_base(config.openai_api_base.clone())
            .with_timeouts(config.session_timeout, config.sdp_timeout),
    );
    let broker = Arc::new(SessionBroker::new(upstream, config.broker_settings()));

    let app_state = Arc::new(AppState {
        broker,
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router ---
    let app = create_router(app_state);

    // --- 5. Start Server ---
    info!(
        model = %config.realtime_model,
        voice = %config.realtime_voice,
        temperature = config.temperature,
        frontend_origin = ?config.frontend_origin,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
