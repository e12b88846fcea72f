use crate::config::ConfigError;
use crate::lending::{EvaluationError, LoanParameterError, ModelLoadError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Models(ModelLoadError),
    Evaluation(EvaluationError),
    /// Request body that could not be decoded into the expected payload.
    InvalidPayload(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Models(err) => write!(f, "model error: {}", err),
            AppError::Evaluation(err) => write!(f, "{}", err),
            AppError::InvalidPayload(detail) => write!(f, "invalid request body: {}", detail),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Models(err) => Some(err),
            AppError::Evaluation(err) => Some(err),
            AppError::InvalidPayload(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Evaluation(err) => evaluation_response(err),
            AppError::InvalidPayload(detail) => {
                let body = Json(json!({ "error": "Invalid request body", "detail": detail }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

/// Validation messages go back verbatim; invalid terms keep the detail alongside a stable
/// summary.
fn evaluation_response(err: EvaluationError) -> Response {
    match err {
        EvaluationError::Validation(inner) => {
            let body = Json(json!({ "error": inner.to_string() }));
            (StatusCode::BAD_REQUEST, body).into_response()
        }
        EvaluationError::InvalidLoanParameters(inner) => {
            let summary = match inner {
                LoanParameterError::NonPositivePrincipal(_)
                | LoanParameterError::NonPositiveTenure
                | LoanParameterError::TenureTooLong { .. }
                | LoanParameterError::InstallmentRoundsToZero { .. } => {
                    "Invalid loan amount or tenure"
                }
                LoanParameterError::InvalidRate(_)
                | LoanParameterError::NonFiniteInstallment { .. } => "Invalid interest rate",
            };
            let body = Json(json!({ "error": summary, "detail": inner.to_string() }));
            (StatusCode::BAD_REQUEST, body).into_response()
        }
        EvaluationError::PredictionUnavailable { model, source } => {
            let body = Json(json!({
                "error": format!("{model} unavailable"),
                "model": model,
                "detail": source.to_string(),
            }));
            (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ModelLoadError> for AppError {
    fn from(value: ModelLoadError) -> Self {
        Self::Models(value)
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(value: axum::extract::rejection::JsonRejection) -> Self {
        Self::InvalidPayload(value.body_text())
    }
}

impl From<EvaluationError> for AppError {
    fn from(value: EvaluationError) -> Self {
        Self::Evaluation(value)
    }
}
