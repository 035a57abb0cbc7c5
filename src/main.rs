// Main entry point - Configuration, wiring and server setup
use anyhow::Context;
use farm_telemetry::infrastructure::config::load_settings;
use farm_telemetry::presentation::app_state::AppState;
use farm_telemetry::presentation::router::build_router;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create adapters and services, then the router
    let state = Arc::new(AppState::from_settings(&settings)?);
    let router = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server.address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.address))?;
    tracing::info!(address = %settings.server.address, "Starting farm-telemetry gateway");

    axum::serve(listener, router).await?;

    Ok(())
}
