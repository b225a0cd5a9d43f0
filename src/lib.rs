//! AI Job Replacement Risk
//!
//! Predicts a Low / Medium / High replacement-risk category for a job record.
//! The `train` binary fits and serializes the model, `risk-api` serves it over
//! HTTP and `dashboard` renders forecasts from the running service.

pub mod app_state;
pub mod config;
pub mod error;
pub mod ml;
pub mod models;
pub mod routes;
pub mod services;
