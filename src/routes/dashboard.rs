use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Form;
use std::fmt::Write;

use crate::app_state::DashboardState;
use crate::models::prediction::PredictResponse;
use crate::services::charts::{self, escape, ChartError};
use crate::services::dashboard::{ForecastControls, ROLES, SECTORS};

const STYLESHEET: &str = include_str!("../../static/dashboard.css");

/// What the main panel shows.
pub enum Panel {
    /// Before the first run; no request has been made.
    Idle,
    Forecast(PredictResponse),
    Error(String),
}

/// GET /: control panel with default selections, idle state.
pub async fn index() -> Html<String> {
    Html(render_page(&ForecastControls::default(), &Panel::Idle))
}

/// POST /forecast: the explicit run action. Issues exactly one call to the
/// prediction service and renders the outcome inline, success or not.
pub async fn forecast(
    State(state): State<DashboardState>,
    form: Result<Form<ForecastControls>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let controls = match form {
        Ok(Form(controls)) => controls.clamped(),
        Err(rejection) => {
            tracing::info!(error = %rejection, "Unreadable forecast form");
            let panel = Panel::Error(format!("Invalid controls: {}", rejection.body_text()));
            return (
                StatusCode::BAD_REQUEST,
                Html(render_page(&ForecastControls::default(), &panel)),
            );
        }
    };

    let record = controls.to_record();
    let panel = match state.client.predict(&record).await {
        Ok(response) => {
            tracing::info!(
                role = %controls.role,
                prediction = %response.prediction,
                "Forecast rendered"
            );
            Panel::Forecast(response)
        }
        Err(e) => {
            tracing::warn!(role = %controls.role, error = %e, "Forecast failed");
            Panel::Error(format!("API Error: {e}"))
        }
    };

    (StatusCode::OK, Html(render_page(&controls, &panel)))
}

fn options(choices: &[&str], selected: &str) -> String {
    let mut out = String::new();
    for choice in choices {
        let _ = write!(
            out,
            r#"<option value="{v}"{sel}>{v}</option>"#,
            v = escape(choice),
            sel = if *choice == selected { " selected" } else { "" }
        );
    }
    out
}

fn slider(name: &str, label: &str, value: f64, max: f64, step: f64) -> String {
    format!(
        r#"<label for="{name}">{label} <output>{value}</output></label><input type="range" id="{name}" name="{name}" min="0" max="{max}" step="{step}" value="{value}" oninput="this.previousElementSibling.lastElementChild.value=this.value">"#
    )
}

/// A chart that fails to render degrades to a notice; the verdict still shows.
fn chart_or_notice(chart: Result<String, ChartError>) -> String {
    chart.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Chart skipped");
        format!(r#"<div class="notice error">{}</div>"#, escape(&e.to_string()))
    })
}

fn render_panel(controls: &ForecastControls, panel: &Panel) -> String {
    match panel {
        Panel::Idle => r#"<div class="notice info">System Ready. Configure parameters and initialize forecast.</div>"#
            .to_string(),
        Panel::Error(message) => {
            format!(r#"<div class="notice error">{}</div>"#, escape(message))
        }
        Panel::Forecast(response) => {
            let color = charts::category_color(response.prediction);
            format!(
                r#"<div class="cards">
  <div class="bento-card"><h3>Risk Verdict</h3><h1 style="color:{color}">{label}</h1></div>
  <div class="bento-card"><h3>Confidence</h3><h1>{confidence:.1}%</h1></div>
</div>
<div class="charts">
  <div class="bento-card"><div class="chart donut" role="img" aria-label="Risk distribution">{donut}</div></div>
  <div class="bento-card"><div class="chart radar" role="img" aria-label="Risk profile">{radar}</div></div>
</div>"#,
                label = response.prediction,
                confidence = response.confidence() * 100.0,
                donut = chart_or_notice(charts::donut_chart(&response.ordered())),
                radar = chart_or_notice(charts::radar_chart(&charts::profile_axes(controls))),
            )
        }
    }
}

/// Whole dashboard document.
pub fn render_page(controls: &ForecastControls, panel: &Panel) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Job Replacement Detector</title>
<style>{STYLESHEET}</style>
</head>
<body>
<aside class="sidebar">
  <h2>CONTROL PANEL</h2>
  <form method="post" action="/forecast">
    <label for="role">Job Role</label>
    <select id="role" name="role">{roles}</select>
    <label for="sector">Sector</label>
    <select id="sector" name="sector">{sectors}</select>
    <h3>Risk Parameters</h3>
    {automation}
    {skill_gap}
    {ai_adoption}
    <button type="submit">RUN FORECAST</button>
  </form>
</aside>
<main>
  <header>
    <div>
      <div class="hero-title">Intelligence Radar</div>
      <div class="hero-subtitle">Scanning displacement vectors for <b>{role}</b></div>
    </div>
    <span class="status-badge">CORE ONLINE</span>
  </header>
  {panel}
</main>
</body>
</html>"#,
        roles = options(&ROLES, &controls.role),
        sectors = options(&SECTORS, &controls.sector),
        automation = slider("automation", "Automation Exposure", controls.automation, 100.0, 1.0),
        skill_gap = slider("skill_gap", "Skill Gap Index", controls.skill_gap, 10.0, 0.1),
        ai_adoption = slider("ai_adoption", "AI Adoption Level", controls.ai_adoption, 10.0, 0.1),
        role = escape(&controls.role),
        panel = render_panel(controls, panel),
    )
}
