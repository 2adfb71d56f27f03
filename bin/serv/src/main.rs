use prx_api::{config::ApiConfig, state::ApiState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    prx_api::tracing::init_tracing(&config.env);

    let metrics_handle = prx_api::metrics::init_metrics()?;

    let state = ApiState::from_config(&config).await?;

    let app = prx_api::router::app(
        state,
        config.parsed_allowed_origins(),
        Some(metrics_handle),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        addr = %config.bind_addr(),
        environment = ?config.env,
        "Recall service listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutdown signal received");
}
