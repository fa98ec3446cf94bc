use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use gcs_core::FieldUpdate;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, loops::broadcast_loop, state::AppState};

fn setup_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::default());
    let app = api::routes().with_state(state.clone());
    (app, state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn telemetry_starts_at_baseline() {
    let (app, _state) = setup_app();

    let res = app.oneshot(get("/api/telemetry")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["link_status"], "NO_DATA_YET");
    assert_eq!(body["battery_percent"], 100);
    assert_eq!(body["flight_mode"], "STANDBY");
}

#[tokio::test]
async fn history_reports_total_count_and_limited_tail() {
    let (app, state) = setup_app();
    for i in 0..5i32 {
        state.telemetry().update(&FieldUpdate {
            altitude_m: Some(f64::from(i)),
            ..Default::default()
        });
        broadcast_loop::tick(&state).unwrap();
    }

    let res = app.oneshot(get("/api/telemetry/history?limit=2")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["count"], 5);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["altitude_m"], 3.0);
    assert_eq!(data[1]["altitude_m"], 4.0);
}

#[tokio::test]
async fn config_update_merges_partial_fields() {
    let (app, _state) = setup_app();

    let res = app
        .clone()
        .oneshot(post_json("/api/alerts/config", json!({ "altitude_max_m": 50 })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["config"]["altitude_max_m"], 50.0);
    assert_eq!(body["config"]["battery_low_threshold"], 20.0);
    assert_eq!(body["config"]["speed_max_ms"], 20.0);
    assert_eq!(body["config"]["enabled"], true);

    let res = app.oneshot(get("/api/alerts")).await.unwrap();
    let body = read_json(res).await;
    assert_eq!(body["config"]["altitude_max_m"], 50.0);
    assert_eq!(body["active_alerts"], json!([]));
}

#[tokio::test]
async fn config_update_rejects_unknown_keys() {
    let (app, state) = setup_app();

    let res = app
        .oneshot(post_json(
            "/api/alerts/config",
            json!({ "altitude_max_m": 50, "injected": true }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("injected"));
    assert_eq!(state.alerts().config().altitude_max_m, 100.0);
}

#[tokio::test]
async fn config_update_rejects_malformed_json_with_error_body() {
    let (app, state) = setup_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/alerts/config")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["status"], "error");
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert_eq!(state.alerts().config(), gcs_core::AlertConfig::default());
}

#[tokio::test]
async fn config_update_without_content_type_uses_error_body() {
    let (app, state) = setup_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/alerts/config")
        .body(Body::from(json!({ "altitude_max_m": 50 }).to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = read_json(res).await;
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("Content-Type"));
    assert_eq!(state.alerts().config().altitude_max_m, 100.0);
}

#[tokio::test]
async fn clear_alerts_is_idempotent() {
    let (app, state) = setup_app();
    state.telemetry().update(&FieldUpdate {
        battery_percent: Some(5),
        ..Default::default()
    });
    broadcast_loop::tick(&state).unwrap();
    assert_eq!(state.alerts().len(), 1);

    for _ in 0..2 {
        let res = app
            .clone()
            .oneshot(post_json("/api/alerts/clear", json!({})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(read_json(res).await["message"], "Alerts cleared");
        assert!(state.alerts().is_empty());
    }
}

#[tokio::test]
async fn stats_without_history_reports_no_data() {
    let (app, _state) = setup_app();

    let res = app.oneshot(get("/api/stats")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["message"], "No flight data available");
}

#[tokio::test]
async fn stats_summarize_history() {
    let (app, state) = setup_app();
    for (alt, speed) in [(10.0, 2.0), (30.0, 6.0)] {
        state.telemetry().update(&FieldUpdate {
            altitude_m: Some(alt),
            ground_speed_ms: Some(speed),
            ..Default::default()
        });
        broadcast_loop::tick(&state).unwrap();
    }

    let res = app.oneshot(get("/api/stats")).await.unwrap();
    let body = read_json(res).await;
    assert_eq!(body["data_points"], 2);
    assert_eq!(body["max_altitude"], 30.0);
    assert_eq!(body["avg_altitude"], 20.0);
    assert_eq!(body["max_speed"], 6.0);
    assert_eq!(body["avg_speed"], 4.0);
    assert!((body["flight_duration_seconds"].as_f64().unwrap() - 0.4).abs() < 1e-9);
}

#[tokio::test]
async fn service_index_lists_endpoints() {
    let (app, _state) = setup_app();

    let res = app.oneshot(get("/")).await.unwrap();
    let body = read_json(res).await;
    assert_eq!(body["endpoints"]["websocket"], "/ws/telemetry");
}
