// File: services/classnet_backend/src/main.rs
use classnet_backend::{build_router, AppState};
use classnet_common::logging;
use classnet_config::load_config;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Arc::new(load_config()?);
    logging::init_from_config(config.logging.as_ref().and_then(|l| l.level.as_deref()));

    let state = AppState::from_config(config.clone()).await?;
    let app = build_router(&state)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, public_url = %config.server.base_url(), "classnet listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized yet.
            error!(error = %e, "classnet failed");
            eprintln!("classnet: {}", e);
            ExitCode::FAILURE
        }
    }
}
