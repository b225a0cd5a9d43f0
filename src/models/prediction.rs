use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::job::RiskCategory;

/// Response for `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: RiskCategory,
    /// Label name to probability, covering every risk category.
    pub class_probabilities: BTreeMap<String, f64>,
}

impl PredictResponse {
    /// Probability of the winning label.
    pub fn confidence(&self) -> f64 {
        self.class_probabilities
            .values()
            .copied()
            .fold(0.0_f64, f64::max)
    }

    /// Probabilities in Low, Medium, High order. Missing labels read as zero.
    pub fn ordered(&self) -> Vec<(RiskCategory, f64)> {
        RiskCategory::all()
            .into_iter()
            .map(|c| {
                let p = self
                    .class_probabilities
                    .get(&c.to_string())
                    .copied()
                    .unwrap_or(0.0);
                (c, p)
            })
            .collect()
    }
}

/// Response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
