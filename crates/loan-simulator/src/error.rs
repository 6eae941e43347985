use crate::config::ConfigError;
use crate::simulator::{ArtifactError, SimulationError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Artifact(ArtifactError),
    Simulation(SimulationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Artifact(err) => write!(f, "artifact error: {}", err),
            AppError::Simulation(err) => write!(f, "simulation error: {}", err),
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
            AppError::Artifact(err) => Some(err),
            AppError::Simulation(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Simulation(err) => simulation_payload(err),
            AppError::Artifact(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn simulation_payload(error: &SimulationError) -> (StatusCode, Value) {
    match error {
        SimulationError::Validation(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "kind": "validation",
                "error": err.to_string(),
                "field": err.field(),
            }),
        ),
        SimulationError::ColumnMismatch(diagnostics) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "kind": "column_mismatch",
                "error": error.to_string(),
                "expected_columns": diagnostics.expected_columns,
                "actual_columns": diagnostics.actual_columns,
                "missing_columns": diagnostics.missing(),
                "unexpected_columns": diagnostics.unexpected(),
                "row": diagnostics.row,
                "note": diagnostics.note,
            }),
        ),
        SimulationError::Inference(detail) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "kind": "inference",
                "error": format!("an unexpected error occurred: {detail}"),
            }),
        ),
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

impl From<ArtifactError> for AppError {
    fn from(value: ArtifactError) -> Self {
        Self::Artifact(value)
    }
}

impl From<SimulationError> for AppError {
    fn from(value: SimulationError) -> Self {
        Self::Simulation(value)
    }
}
