pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod predict;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::{AppState, DashboardState};

/// Prediction service routes with the standard middleware stack. `/metrics`
/// is mounted only when a Prometheus handle is supplied.
pub fn api_router(
    state: AppState,
    prometheus: Option<Arc<PrometheusHandle>>,
    max_body_bytes: usize,
) -> Router {
    let mut router = Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health_check))
        .route("/predict", post(predict::predict))
        .with_state(state);

    if let Some(handle) = prometheus {
        router = router.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(handle),
        );
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
}

/// Dashboard pages.
pub fn dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/forecast", post(dashboard::forecast))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
}
