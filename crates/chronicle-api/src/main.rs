//! Chronicle API server entry point.

use chronicle_api::config::AppConfig;
use chronicle_api::error::AppError;
use chronicle_api::state::AppState;
use chronicle_api::{app, telemetry};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!(environment = %config.environment, "Starting Chronicle API server");

    let state = AppState::from_config(&config)?;
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("Chronicle API server stopped");
    telemetry.shutdown();
    Ok(())
}
