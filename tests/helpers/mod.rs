//! Test helper utilities: synthetic data, a trained model and request plumbing

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use job_risk_radar::{
    app_state::AppState,
    config::TrainConfig,
    ml::pipeline::RiskPipeline,
    models::job::JobRecord,
    routes,
    services::training::{self, LabeledJob},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use std::sync::OnceLock;
use tower::ServiceExt;

pub const ROLES: [&str; 5] = [
    "Data Analyst",
    "Teacher",
    "Software Engineer",
    "Truck Driver",
    "Accountant",
];
pub const INDUSTRIES: [&str; 4] = ["Technology", "Finance", "Education", "Industrial"];
pub const COUNTRIES: [&str; 3] = ["USA", "India", "Global"];

/// Random job record drawn from the synthetic vocabulary.
pub fn random_record(rng: &mut impl Rng) -> JobRecord {
    let salary_before = rng.gen_range(40000.0..150000.0);
    let change = rng.gen_range(-30.0..10.0);
    JobRecord {
        job_role: ROLES[rng.gen_range(0..ROLES.len())].to_string(),
        industry: INDUSTRIES[rng.gen_range(0..INDUSTRIES.len())].to_string(),
        country: COUNTRIES[rng.gen_range(0..COUNTRIES.len())].to_string(),
        year: rng.gen_range(2020..=2026),
        automation_risk_percent: rng.gen_range(0.0..100.0),
        skill_gap_index: rng.gen_range(0.0..10.0),
        salary_before_usd: salary_before,
        salary_after_usd: salary_before * (1.0 + change / 100.0),
        salary_change_percent: change,
        skill_demand_growth_percent: rng.gen_range(-20.0..40.0),
        remote_feasibility_score: rng.gen_range(0.0..10.0),
        ai_adoption_level: rng.gen_range(0.0..10.0),
        education_requirement_level: rng.gen_range(1..=5),
    }
}

/// Labeled rows whose score is driven by automation, AI adoption and skill gap.
pub fn synthetic_dataset(n: usize, seed: u64) -> Vec<LabeledJob> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let record = random_record(&mut rng);
            let score = 0.6 * record.automation_risk_percent
                + 3.0 * record.ai_adoption_level
                + record.skill_gap_index
                + rng.gen_range(-5.0..5.0);
            LabeledJob { record, score }
        })
        .collect()
}

/// Small, fast forest for tests.
pub fn test_config() -> TrainConfig {
    TrainConfig {
        n_estimators: 20,
        ..TrainConfig::default()
    }
}

/// One trained pipeline per test binary.
pub fn trained_pipeline() -> &'static RiskPipeline {
    static PIPELINE: OnceLock<RiskPipeline> = OnceLock::new();
    PIPELINE.get_or_init(|| {
        let (pipeline, _) = training::train(&synthetic_dataset(300, 7), &test_config())
            .expect("synthetic training should succeed");
        pipeline
    })
}

pub fn app() -> Router {
    routes::api_router(AppState::new(trained_pipeline().clone()), None, 64 * 1024)
}

/// Write rows as a CSV with a leading `job_id` column.
pub fn write_dataset_csv(rows: &[LabeledJob], path: &Path) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer
        .write_record([
            "job_id",
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
            "ai_replacement_score",
        ])
        .unwrap();
    for (i, row) in rows.iter().enumerate() {
        let r = &row.record;
        writer
            .write_record([
                format!("J{i:05}"),
                r.job_role.clone(),
                r.industry.clone(),
                r.country.clone(),
                r.year.to_string(),
                r.automation_risk_percent.to_string(),
                r.skill_gap_index.to_string(),
                r.salary_before_usd.to_string(),
                r.salary_after_usd.to_string(),
                r.salary_change_percent.to_string(),
                r.skill_demand_growth_percent.to_string(),
                r.remote_feasibility_score.to_string(),
                r.ai_adoption_level.to_string(),
                r.education_requirement_level.to_string(),
                row.score.to_string(),
            ])
            .unwrap();
    }
    writer.flush().unwrap();
}

/// Send a request through the router and decode the JSON response body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Probabilities of a `/predict` body as `(label, p)` pairs.
pub fn probabilities(body: &serde_json::Value) -> Vec<(String, f64)> {
    body["class_probabilities"]
        .as_object()
        .expect("class_probabilities must be an object")
        .iter()
        .map(|(k, v)| (k.clone(), v.as_f64().expect("probability must be a number")))
        .collect()
}

/// Assert the response is a full distribution whose argmax is the prediction.
pub fn assert_valid_prediction(body: &serde_json::Value) {
    let prediction = body["prediction"].as_str().expect("prediction must be a string");
    assert!(
        ["Low", "Medium", "High"].contains(&prediction),
        "unexpected label {prediction}"
    );

    let probs = probabilities(body);
    let mut labels: Vec<&str> = probs.iter().map(|(k, _)| k.as_str()).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec!["High", "Low", "Medium"]);

    let sum: f64 = probs.iter().map(|(_, p)| p).sum();
    assert!((sum - 1.0).abs() <= 1e-6, "probabilities sum to {sum}");
    assert!(probs.iter().all(|(_, p)| (0.0..=1.0).contains(p)));

    let max = probs.iter().map(|(_, p)| *p).fold(f64::MIN, f64::max);
    let winner = probs.iter().find(|(k, _)| k == prediction).unwrap().1;
    assert_eq!(winner, max, "prediction {prediction} is not the most probable label");
}
