use std::sync::Arc;

use crate::ml::pipeline::RiskPipeline;
use crate::services::dashboard::PredictionClient;

/// Shared state of the prediction service. The model is loaded once at
/// startup and only ever read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<RiskPipeline>,
}

impl AppState {
    pub fn new(model: RiskPipeline) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

/// Shared state of the dashboard.
#[derive(Clone)]
pub struct DashboardState {
    pub client: Arc<PredictionClient>,
}

impl DashboardState {
    pub fn new(client: PredictionClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
