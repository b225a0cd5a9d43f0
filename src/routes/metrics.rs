use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

/// Install the global Prometheus recorder and describe the service metrics.
pub fn install_recorder() -> Result<Arc<PrometheusHandle>, metrics_exporter_prometheus::BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!("predictions_total", "Predictions served, by label");
    metrics::describe_counter!(
        "prediction_failures_total",
        "Predictions that failed after validation"
    );
    metrics::describe_counter!(
        "validation_rejections_total",
        "Requests rejected before reaching the model"
    );
    metrics::describe_histogram!(
        "prediction_latency_seconds",
        "Time spent running one record through the model"
    );

    Ok(Arc::new(handle))
}

/// Prometheus metrics scrape endpoint.
/// Returns metrics in Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
