use job_risk_radar::{
    app_state::DashboardState, config::AppConfig, routes, services::dashboard::PredictionClient,
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

    let config = AppConfig::from_env()?.dashboard();

    tracing::info!(
        api = %config.api_base_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Initializing dashboard"
    );
    let client = PredictionClient::new(&config.api_base_url, config.request_timeout)?;
    let app = routes::dashboard_router(DashboardState::new(client));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Dashboard listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
