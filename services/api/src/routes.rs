use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use loan_simulator::simulator::{
    simulation_router, BinaryClassifier, FeatureScaler, SimulatorState,
};
use serde_json::json;
use std::sync::Arc;

const INDEX_PAGE: &str = include_str!("../assets/index.html");

pub(crate) fn with_simulation_routes<C, S>(state: Arc<SimulatorState<C, S>>) -> axum::Router
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    simulation_router(state)
        .route("/", axum::routing::get(index_page))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn index_page() -> impl IntoResponse {
    let content_type = mime_guess::from_path("index.html").first_or_octet_stream();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type.to_string())],
        INDEX_PAGE,
    )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
