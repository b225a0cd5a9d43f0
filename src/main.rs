use job_risk_radar::{
    app_state::AppState,
    config::AppConfig,
    ml::pipeline::RiskPipeline,
    routes,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration from environment");
    })?;

    tracing::info!("Initializing risk prediction API");

    // The service never starts without a usable model
    tracing::info!(path = %config.model_path, "Loading model artifact");
    let model = RiskPipeline::load(&config.model_path).inspect_err(|e| {
        tracing::error!(path = %config.model_path, error = %e, "Failed to load model artifact");
    })?;
    tracing::info!(
        model_id = %model.metadata.model_id,
        trained_at = %model.metadata.trained_at,
        features = model.n_features(),
        holdout_accuracy = ?model.metadata.holdout_accuracy,
        "Model loaded"
    );

    let prometheus_handle = routes::metrics::install_recorder()?;

    let state = AppState::new(model);
    let app = routes::api_router(state, Some(prometheus_handle), config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .inspect_err(|e| tracing::error!(addr = %config.bind_addr, error = %e, "Failed to bind"))?;

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
