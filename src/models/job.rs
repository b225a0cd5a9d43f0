use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Categorical columns, one-hot encoded by the model.
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["job_role", "industry", "country"];

/// Numeric columns, passed through to the classifier unchanged.
pub const NUMERIC_COLUMNS: [&str; 10] = [
    "year",
    "automation_risk_percent",
    "skill_gap_index",
    "salary_before_usd",
    "salary_after_usd",
    "salary_change_percent",
    "skill_demand_growth_percent",
    "remote_feasibility_score",
    "ai_adoption_level",
    "education_requirement_level",
];

/// Every field a job record must supply.
pub const FEATURE_COLUMNS: [&str; 13] = [
    "job_role",
    "industry",
    "country",
    "year",
    "automation_risk_percent",
    "skill_gap_index",
    "salary_before_usd",
    "salary_after_usd",
    "salary_change_percent",
    "skill_demand_growth_percent",
    "remote_feasibility_score",
    "ai_adoption_level",
    "education_requirement_level",
];

/// One job description, the unit of prediction input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JobRecord {
    #[garde(length(min = 1))]
    pub job_role: String,

    #[garde(length(min = 1))]
    pub industry: String,

    #[garde(length(min = 1))]
    pub country: String,

    #[garde(skip)]
    pub year: i32,

    #[garde(range(min = 0.0, max = 100.0))]
    pub automation_risk_percent: f64,

    #[garde(skip)]
    pub skill_gap_index: f64,

    #[garde(skip)]
    pub salary_before_usd: f64,

    #[garde(skip)]
    pub salary_after_usd: f64,

    #[garde(skip)]
    pub salary_change_percent: f64,

    #[garde(skip)]
    pub skill_demand_growth_percent: f64,

    #[garde(skip)]
    pub remote_feasibility_score: f64,

    #[garde(skip)]
    pub ai_adoption_level: f64,

    #[garde(skip)]
    pub education_requirement_level: i32,
}

impl JobRecord {
    /// Value of a categorical column by name.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "job_role" => Some(&self.job_role),
            "industry" => Some(&self.industry),
            "country" => Some(&self.country),
            _ => None,
        }
    }

    /// Value of a numeric column by name, widened to `f64`.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        let value = match column {
            "year" => f64::from(self.year),
            "automation_risk_percent" => self.automation_risk_percent,
            "skill_gap_index" => self.skill_gap_index,
            "salary_before_usd" => self.salary_before_usd,
            "salary_after_usd" => self.salary_after_usd,
            "salary_change_percent" => self.salary_change_percent,
            "skill_demand_growth_percent" => self.skill_demand_growth_percent,
            "remote_feasibility_score" => self.remote_feasibility_score,
            "ai_adoption_level" => self.ai_adoption_level,
            "education_requirement_level" => f64::from(self.education_requirement_level),
            _ => return None,
        };
        Some(value)
    }
}

/// Three-level ordinal replacement-risk label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const COUNT: usize = 3;

    /// Position in the Low < Medium < High ordering.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}
