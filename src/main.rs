use anyhow::Context;
use coffeeshop::logging::init_tracing;
use coffeeshop::metrics::{init_metrics, metrics_app};
use coffeeshop::router::init_router;
use coffeeshop::state::init_app_state;
use coffeeshop_config::ServerConfig;
use dotenvy::dotenv;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("failed to create log directory")?;

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics().context("failed to install metrics recorder")? {
        let metrics_address = server_config.metrics_address();
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(&metrics_address).await {
                Ok(listener) => {
                    info!("📊 Metrics available at http://{}/metrics", metrics_address);
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        error!(error = %e, "Metrics server stopped");
                    }
                }
                Err(e) => error!(error = %e, address = %metrics_address, "Failed to bind metrics server"),
            }
        });
    }

    let state = init_app_state().await?;
    let app = init_router(state);

    let address = server_config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("🚀 Server running on http://{}", address);
    info!("📚 Swagger UI available at http://{}/swagger-ui", address);
    info!("📖 Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app)
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
