//! Request bodies shared by the HTTP tests

use serde_json::{json, Value};

/// The reference scenario: a high-automation industrial role.
pub fn truck_driver() -> Value {
    json!({
        "job_role": "Truck Driver",
        "industry": "Industrial",
        "country": "Global",
        "year": 2026,
        "automation_risk_percent": 90.0,
        "skill_gap_index": 7.0,
        "salary_before_usd": 100000,
        "salary_after_usd": 90000,
        "salary_change_percent": -10.0,
        "skill_demand_growth_percent": 15.0,
        "remote_feasibility_score": 3.0,
        "ai_adoption_level": 8.0,
        "education_requirement_level": 1
    })
}

/// Role, industry and country that never appear in the synthetic training data.
pub fn never_seen_categories() -> Value {
    let mut body = truck_driver();
    body["job_role"] = json!("Lighthouse Keeper");
    body["industry"] = json!("Maritime");
    body["country"] = json!("Atlantis");
    body
}

/// Bodies that carry every field but one of the wrong JSON type.
pub fn mistyped_bodies() -> Vec<(&'static str, Value)> {
    let cases = [
        ("job_role", json!(42)),
        ("year", json!("2026")),
        ("year", json!(2026.5)),
        ("automation_risk_percent", json!("high")),
        ("salary_before_usd", json!(null)),
        ("education_requirement_level", json!([1])),
    ];
    cases
        .into_iter()
        .map(|(field, value)| {
            let mut body = truck_driver();
            body[field] = value;
            (field, body)
        })
        .collect()
}
