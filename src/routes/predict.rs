use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use std::time::Instant;

use crate::app_state::AppState;
use crate::error::{ApiError, ValidJson};
use crate::models::job::JobRecord;
use crate::models::prediction::PredictResponse;

/// POST /predict: classify one job record.
pub async fn predict(
    State(state): State<AppState>,
    ValidJson(record): ValidJson<JobRecord>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = Instant::now();
    let model = Arc::clone(&state.model);

    let prediction = tokio::task::spawn_blocking(move || model.predict(&record))
        .await
        .map_err(|e| ApiError::Inference(format!("inference task aborted: {e}")))?
        .map_err(|e| ApiError::Inference(e.to_string()))?;

    let elapsed = start.elapsed();
    metrics::histogram!("prediction_latency_seconds").record(elapsed.as_secs_f64());
    metrics::counter!("predictions_total", "label" => prediction.label.to_string()).increment(1);

    tracing::info!(
        prediction = %prediction.label,
        latency_us = elapsed.as_micros() as u64,
        "Prediction served"
    );

    Ok(Json(prediction.into_response()))
}
