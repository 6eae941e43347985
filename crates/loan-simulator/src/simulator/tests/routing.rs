use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::simulator::router::{submit_handler, SimulatorState};
use crate::simulator::scaler::Scaler;

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("encode payload")))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

fn applicant_payload() -> Value {
    serde_json::to_value(applicant()).expect("encode applicant")
}

#[tokio::test]
async fn simulate_route_returns_the_verdict() {
    let router = router_with(build_simulator());

    let response = router
        .oneshot(post_json("/api/v1/simulations", &applicant_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["applicant"], "Ana Souza");
    assert_eq!(payload["decision"], "approved");
    assert_eq!(
        payload["headline"],
        "Congratulations! Your loan was APPROVED!"
    );
    assert!(payload["approval_percentage"]
        .as_str()
        .expect("percentage string")
        .ends_with('%'));
    assert_eq!(payload["display"]["loan_term"], "360 months");
}

#[tokio::test]
async fn simulate_route_accepts_partial_forms() {
    let router = router_with(build_simulator());

    let response = router
        .oneshot(post_json(
            "/api/v1/simulations",
            &json!({ "name": "Bruno Lima", "credit_history": false }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"], "rejected");
    assert_eq!(payload["echo"]["applicant_income"], 5000.0);
}

#[tokio::test]
async fn simulate_route_rejects_blank_names() {
    let router = router_with(build_simulator());

    let response = router
        .oneshot(post_json("/api/v1/simulations", &json!({ "name": "" })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "validation");
    assert_eq!(payload["field"], "name");
}

#[tokio::test]
async fn simulate_route_rejects_missing_income() {
    let router = router_with(build_simulator());

    let response = router
        .oneshot(post_json(
            "/api/v1/simulations",
            &json!({ "name": "Ana", "applicant_income": 0.0, "coapplicant_income": 0.0 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["field"], "applicant_income");
}

#[tokio::test]
async fn simulate_route_reports_column_mismatch() {
    let (simulator, _) = stub_simulator(MismatchedClassifier);
    let router = router_with(simulator);

    let response = router
        .oneshot(post_json("/api/v1/simulations", &applicant_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "column_mismatch");
    assert_eq!(payload["actual_columns"], json!(model_columns()));
    assert_eq!(payload["expected_columns"][0], "Loan_Amount_Term");
    assert_eq!(payload["row"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn simulate_route_reports_inference_failures() {
    let (simulator, _) = stub_simulator(BrokenClassifier);
    let router = router_with(simulator);

    let response = router
        .oneshot(post_json("/api/v1/simulations", &applicant_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "inference");
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .starts_with("an unexpected error occurred"));
}

#[tokio::test]
async fn defaults_route_returns_the_initial_form() {
    let router = router_with(build_simulator());

    let response = router
        .oneshot(get("/api/v1/simulations/defaults"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["name"], "");
    assert_eq!(payload["applicant_income"], 5000.0);
    assert_eq!(payload["loan_amount_term"], 360.0);
    assert_eq!(payload["dependents"], "0");
}

#[tokio::test]
async fn submit_handler_stores_the_result_in_the_session() {
    let state = Arc::new(SimulatorState::new(build_simulator()));

    let response = submit_handler::<_, Scaler>(State(state.clone()), axum::Json(applicant()))
        .await
        .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["state"], "result_shown");
    assert_eq!(payload["result"]["applicant"], "Ana Souza");
    assert!(payload.get("simulated_at").is_some());
    assert!(state.session().result().is_some());
}

#[tokio::test]
async fn session_routes_follow_submit_and_reset() {
    let router = router_with(build_simulator());

    let response = router
        .clone()
        .oneshot(post_json("/api/v1/session/submit", &applicant_payload()))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(get("/api/v1/session"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["state"], "result_shown");
    assert_eq!(payload["form"]["name"], "Ana Souza");

    let response = router
        .clone()
        .oneshot(Request::post("/api/v1/session/reset").body(Body::empty()).expect("request builds"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["state"], "idle");
    assert_eq!(payload["form"]["name"], "");
    assert!(payload.get("result").is_none());
}

#[tokio::test]
async fn session_submit_with_blank_name_keeps_state() {
    let router = router_with(build_simulator());

    let response = router
        .clone()
        .oneshot(post_json("/api/v1/session/submit", &json!({ "name": " " })))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .oneshot(get("/api/v1/session"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["state"], "idle");
    assert_eq!(payload["form"]["name"], " ");
}

#[tokio::test]
async fn submit_handler_maps_validation_errors_through_app_error() {
    let state = Arc::new(SimulatorState::new(build_simulator()));

    let response = submit_handler::<_, Scaler>(
        State(state.clone()),
        axum::Json(crate::simulator::LoanApplication::default()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "validation");
    assert_eq!(payload["field"], "name");
    assert!(state.session().result().is_none());
}
