use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::job::JobRecord;
use crate::models::prediction::{ErrorResponse, PredictResponse};

pub const ROLES: [&str; 10] = [
    "Data Analyst",
    "Accountant",
    "Teacher",
    "Customer Support Rep",
    "Software Engineer",
    "Marketing Specialist",
    "Financial Analyst",
    "HR Manager",
    "Mechanical Engineer",
    "Truck Driver",
];

pub const SECTORS: [&str; 5] = ["Technology", "Finance", "Healthcare", "Industrial", "Other"];

// Placeholders for the fields the dashboard does not expose.
pub const DEFAULT_COUNTRY: &str = "Global";
pub const DEFAULT_YEAR: i32 = 2026;
pub const DEFAULT_SALARY_BEFORE_USD: f64 = 100000.0;
pub const DEFAULT_SALARY_AFTER_USD: f64 = 90000.0;
pub const DEFAULT_SALARY_CHANGE_PERCENT: f64 = -10.0;
pub const DEFAULT_SKILL_DEMAND_GROWTH_PERCENT: f64 = 15.0;
pub const DEFAULT_REMOTE_FEASIBILITY_SCORE: f64 = 7.0;
pub const DEFAULT_EDUCATION_REQUIREMENT_LEVEL: i32 = 3;

/// Control-panel selections for one forecast. Submitted as a form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastControls {
    pub role: String,
    pub sector: String,
    /// Automation exposure slider, 0..=100.
    pub automation: f64,
    /// 0.0..=10.0
    pub skill_gap: f64,
    /// 0.0..=10.0
    pub ai_adoption: f64,
}

impl Default for ForecastControls {
    fn default() -> Self {
        Self {
            role: ROLES[0].to_string(),
            sector: SECTORS[0].to_string(),
            automation: 60.0,
            skill_gap: 4.5,
            ai_adoption: 6.0,
        }
    }
}

impl ForecastControls {
    /// Pull every value back into its control's range. Unknown options fall
    /// back to the first choice; non-finite numbers to the slider default.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let pick = |value: &str, options: &[&str], fallback: &str| {
            options
                .iter()
                .find(|o| **o == value)
                .map_or_else(|| fallback.to_string(), |o| o.to_string())
        };
        let bound = |value: f64, max: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(0.0, max)
            } else {
                fallback
            }
        };

        Self {
            role: pick(&self.role, &ROLES, &defaults.role),
            sector: pick(&self.sector, &SECTORS, &defaults.sector),
            automation: bound(self.automation, 100.0, defaults.automation).round(),
            skill_gap: bound(self.skill_gap, 10.0, defaults.skill_gap),
            ai_adoption: bound(self.ai_adoption, 10.0, defaults.ai_adoption),
        }
    }

    /// Full record: user selections plus the fixed placeholders.
    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            job_role: self.role.clone(),
            industry: self.sector.clone(),
            country: DEFAULT_COUNTRY.to_string(),
            year: DEFAULT_YEAR,
            automation_risk_percent: self.automation,
            skill_gap_index: self.skill_gap,
            salary_before_usd: DEFAULT_SALARY_BEFORE_USD,
            salary_after_usd: DEFAULT_SALARY_AFTER_USD,
            salary_change_percent: DEFAULT_SALARY_CHANGE_PERCENT,
            skill_demand_growth_percent: DEFAULT_SKILL_DEMAND_GROWTH_PERCENT,
            remote_feasibility_score: DEFAULT_REMOTE_FEASIBILITY_SCORE,
            ai_adoption_level: self.ai_adoption,
            education_requirement_level: DEFAULT_EDUCATION_REQUIREMENT_LEVEL,
        }
    }
}

/// HTTP client for the prediction service. One call per forecast, no retry.
pub struct PredictionClient {
    http: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DashboardError::Http)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn predict(&self, record: &JobRecord) -> Result<PredictResponse, DashboardError> {
        let url = format!("{}/predict", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DashboardError::Timeout
                } else {
                    DashboardError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // surface the service's `detail` when it sent one
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            return Err(DashboardError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let bytes = response.bytes().await.map_err(DashboardError::Http)?;
        let prediction: PredictResponse =
            serde_json::from_slice(&bytes).map_err(DashboardError::Decode)?;
        Ok(prediction)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Prediction service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prediction service did not answer in time")]
    Timeout,

    #[error("Prediction service returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Failed to decode prediction response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_fixed_placeholders() {
        let controls = ForecastControls {
            role: "Truck Driver".to_string(),
            sector: "Industrial".to_string(),
            automation: 90.0,
            skill_gap: 7.0,
            ai_adoption: 8.0,
        };
        let record = controls.to_record();
        assert_eq!(record.job_role, "Truck Driver");
        assert_eq!(record.industry, "Industrial");
        assert_eq!(record.automation_risk_percent, 90.0);
        assert_eq!(record.skill_gap_index, 7.0);
        assert_eq!(record.ai_adoption_level, 8.0);
        assert_eq!(record.country, "Global");
        assert_eq!(record.year, 2026);
        assert_eq!(record.salary_before_usd, 100000.0);
        assert_eq!(record.salary_after_usd, 90000.0);
        assert_eq!(record.salary_change_percent, -10.0);
        assert_eq!(record.skill_demand_growth_percent, 15.0);
        assert_eq!(record.remote_feasibility_score, 7.0);
        assert_eq!(record.education_requirement_level, 3);

        // placeholders do not depend on the selections
        let other = ForecastControls::default().to_record();
        assert_eq!(other.country, record.country);
        assert_eq!(other.salary_before_usd, record.salary_before_usd);
    }

    #[test]
    fn test_clamped_controls() {
        let wild = ForecastControls {
            role: "<script>".to_string(),
            sector: "Finance".to_string(),
            automation: 140.4,
            skill_gap: -3.0,
            ai_adoption: f64::NAN,
        };
        let c = wild.clamped();
        assert_eq!(c.role, "Data Analyst");
        assert_eq!(c.sector, "Finance");
        assert_eq!(c.automation, 100.0);
        assert_eq!(c.skill_gap, 0.0);
        assert_eq!(c.ai_adoption, 6.0);
        assert_eq!(ForecastControls::default().clamped(), ForecastControls::default());
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = PredictionClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
