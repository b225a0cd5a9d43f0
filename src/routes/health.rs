use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::job::RiskCategory;
use crate::models::prediction::MessageResponse;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: ModelInfo,
}

#[derive(Serialize)]
pub struct ModelInfo {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub classes: Vec<RiskCategory>,
    pub n_features: usize,
    pub holdout_accuracy: Option<f64>,
}

/// GET /: liveness check.
pub async fn home() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "API is online".to_string(),
    })
}

/// GET /health: liveness plus a summary of the loaded model.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = &state.model;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: ModelInfo {
            model_id: model.metadata.model_id,
            trained_at: model.metadata.trained_at,
            classes: model.classes().to_vec(),
            n_features: model.n_features(),
            holdout_accuracy: model.metadata.holdout_accuracy,
        },
    })
}
