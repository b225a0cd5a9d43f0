use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Prediction service bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path of the trained model artifact (written by `train`, read by `risk-api`).
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Maximum accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Labeled CSV dataset used by the training pipeline.
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    #[serde(default = "default_train_seed")]
    pub train_seed: u64,

    /// Holdout fraction for the stratified split.
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Optional depth cap for every tree. Unlimited when unset.
    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default = "default_smote_k_neighbors")]
    pub smote_k_neighbors: usize,

    /// Dashboard bind address.
    #[serde(default = "default_dashboard_bind_addr")]
    pub dashboard_bind_addr: String,

    /// Base URL of the prediction service as seen from the dashboard.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for a single dashboard-to-service call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Settings consumed by the training pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub seed: u64,
    pub test_size: f64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub smote_k_neighbors: usize,
}

/// Settings consumed by the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub bind_addr: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_model_path() -> String {
    "model.json".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_dataset_path() -> String {
    "ai_job_replacement_2020_2026.csv".to_string()
}

fn default_train_seed() -> u64 {
    42
}

fn default_test_size() -> f64 {
    0.2
}

fn default_n_estimators() -> usize {
    100
}

fn default_smote_k_neighbors() -> usize {
    5
}

fn default_dashboard_bind_addr() -> String {
    "0.0.0.0:8501".to_string()
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn train(&self) -> TrainConfig {
        TrainConfig {
            seed: self.train_seed,
            test_size: self.test_size,
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            smote_k_neighbors: self.smote_k_neighbors,
        }
    }

    pub fn dashboard(&self) -> DashboardConfig {
        DashboardConfig {
            bind_addr: self.dashboard_bind_addr.clone(),
            api_base_url: self.api_base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: default_train_seed(),
            test_size: default_test_size(),
            n_estimators: default_n_estimators(),
            max_depth: None,
            smote_k_neighbors: default_smote_k_neighbors(),
        }
    }
}
