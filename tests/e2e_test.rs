//! Dashboard against a live prediction service on a loopback port.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::Router;
use helpers::*;
use http_body_util::BodyExt;
use job_risk_radar::{
    app_state::DashboardState,
    models::job::RiskCategory,
    routes,
    services::dashboard::{DashboardError, ForecastControls, PredictionClient},
};
use std::time::Duration;
use tower::ServiceExt;

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn client(base_url: &str, timeout: Duration) -> PredictionClient {
    PredictionClient::new(base_url, timeout).unwrap()
}

async fn dashboard_page(state: DashboardState, request: Request<Body>) -> (StatusCode, String) {
    let response = routes::dashboard_router(state)
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn forecast_request(form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/forecast")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_client_round_trip_with_defaults() {
    let base = spawn_server(app()).await;
    let client = client(&base, Duration::from_secs(10));

    let controls = ForecastControls {
        role: "Truck Driver".to_string(),
        sector: "Industrial".to_string(),
        automation: 90.0,
        skill_gap: 7.0,
        ai_adoption: 8.0,
    };
    let response = client.predict(&controls.to_record()).await.unwrap();

    let ordered = response.ordered();
    assert_eq!(
        ordered.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
        RiskCategory::all()
    );
    let sum: f64 = ordered.iter().map(|(_, p)| p).sum();
    assert!((sum - 1.0).abs() <= 1e-6);
    let expected = trained_pipeline().predict(&controls.to_record()).unwrap();
    assert_eq!(response.prediction, expected.label);
}

#[tokio::test]
async fn test_client_surfaces_service_rejection() {
    let base = spawn_server(app()).await;
    let client = client(&base, Duration::from_secs(10));

    let mut record = ForecastControls::default().to_record();
    record.automation_risk_percent = 250.0;
    match client.predict(&record).await {
        Err(DashboardError::Status { status, detail }) => {
            assert_eq!(status, 422);
            assert!(detail.contains("automation_risk_percent"), "{detail}");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_times_out_without_retry() {
    let slow = Router::new().route(
        "/predict",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "too late"
        }),
    );
    let base = spawn_server(slow).await;
    let client = client(&base, Duration::from_millis(200));

    let started = std::time::Instant::now();
    let result = client.predict(&ForecastControls::default().to_record()).await;
    assert!(matches!(result, Err(DashboardError::Timeout)), "{result:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_dashboard_idle_until_run() {
    // the idle page must render even though no service is reachable
    let state = DashboardState::new(client(&dead_url().await, Duration::from_secs(1)));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, html) = dashboard_page(state, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("System Ready"));
    assert!(!html.contains("API Error"));
}

#[tokio::test]
async fn test_dashboard_forecast_renders_result() {
    let base = spawn_server(app()).await;
    let state = DashboardState::new(client(&base, Duration::from_secs(10)));

    let (status, html) = dashboard_page(
        state,
        forecast_request("role=Truck+Driver&sector=Industrial&automation=90&skill_gap=7&ai_adoption=8"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Risk Verdict"), "{html}");
    assert!(html.contains("Confidence"));
    assert!(html.contains("chart donut"));
    assert!(html.contains("chart radar"));
    assert!(html.contains("Scanning displacement vectors for <b>Truck Driver</b>"));
}

#[tokio::test]
async fn test_dashboard_shows_inline_error_when_service_down() {
    let state = DashboardState::new(client(&dead_url().await, Duration::from_secs(2)));

    let (status, html) = dashboard_page(
        state,
        forecast_request("role=Teacher&sector=Finance&automation=30&skill_gap=2.5&ai_adoption=4"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("API Error"));
    assert!(!html.contains("Risk Verdict"));
    // controls keep the submitted values for another attempt
    assert!(html.contains(r#"<option value="Teacher" selected>"#));
    assert!(html.contains(r#"value="2.5""#));
    assert!(html.contains("RUN FORECAST"));
}

#[tokio::test]
async fn test_dashboard_rejects_unreadable_form() {
    let state = DashboardState::new(client(&dead_url().await, Duration::from_secs(1)));
    let (status, html) = dashboard_page(state, forecast_request("role=Teacher&automation=lots")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Invalid controls"));
    assert!(html.contains("RUN FORECAST"));
}
