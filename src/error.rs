use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;
use serde::de::DeserializeOwned;

use crate::models::prediction::ErrorResponse;

/// Errors surfaced by the prediction service handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, mistyped or out-of-range field.
    #[error("{0}")]
    Validation(String),

    /// Request could not be read as JSON at all.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
            other => ApiError::Rejected {
                status: other.status(),
                detail: other.body_text(),
            },
        }
    }
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        ApiError::Validation(report.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Inference(detail) => {
                tracing::error!(error = %detail, "Inference failed");
                metrics::counter!("prediction_failures_total", "kind" => "inference").increment(1);
            }
            _ => {
                tracing::info!(status = status.as_u16(), error = %self, "Request rejected");
                metrics::counter!("validation_rejections_total").increment(1);
            }
        }

        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body extractor that also runs `garde` validation, so handlers only
/// ever see records that satisfy the schema.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    T::Context: Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}
