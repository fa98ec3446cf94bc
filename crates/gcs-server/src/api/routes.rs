//! REST API routes.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use gcs_core::{AlertConfig, AlertConfigUpdate, AlertRecord, FlightStats, TelemetrySnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::{ws, ApiError};
use crate::state::AppState;

/// Alerts returned by `GET /api/alerts`.
const ALERTS_PAGE: usize = 20;
const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(|| async { "OK" }))
        .route("/api/telemetry", get(get_telemetry))
        .route("/api/telemetry/history", get(get_history))
        .route("/api/alerts", get(get_alerts))
        .route("/api/alerts/config", post(update_alert_config))
        .route("/api/alerts/clear", post(clear_alerts))
        .route("/api/stats", get(get_stats))
        // WebSocket streaming
        .route("/ws/telemetry", get(ws::ws_handler))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Entries currently retained, not the number returned
    pub count: usize,
    pub data: Vec<TelemetrySnapshot>,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub config: AlertConfig,
    pub active_alerts: Vec<AlertRecord>,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub status: &'static str,
    pub config: AlertConfig,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Stats(FlightStats),
    NoData { message: &'static str },
}

// === Handlers ===

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "Cloud GCS MAVLink Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "telemetry": "/api/telemetry",
            "history": "/api/telemetry/history",
            "alerts": "/api/alerts",
            "stats": "/api/stats",
            "websocket": "/ws/telemetry"
        }
    }))
}

async fn get_telemetry(State(state): State<Arc<AppState>>) -> Json<TelemetrySnapshot> {
    Json(state.telemetry().read())
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = state.history();
    Json(HistoryResponse {
        count: history.len(),
        data: history.recent(limit),
    })
}

async fn get_alerts(State(state): State<Arc<AppState>>) -> Json<AlertsResponse> {
    Json(AlertsResponse {
        config: state.alerts().config(),
        active_alerts: state.alerts().recent(ALERTS_PAGE),
    })
}

/// POST /api/alerts/config
///
/// Accepts a partial config. Malformed bodies, unknown keys, wrong types and
/// out-of-range values are rejected and the live config is left as it was.
async fn update_alert_config(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let Json(body) = body?;
    let update = AlertConfigUpdate::from_json(body)?;
    let config = state.alerts().configure(&update)?;
    Ok(Json(ConfigResponse {
        status: "success",
        config,
    }))
}

async fn clear_alerts(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.alerts().clear();
    tracing::info!("Active alerts cleared");
    Json(json!({ "status": "success", "message": "Alerts cleared" }))
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.history().stats(state.config().tick_period_secs());
    Json(match stats {
        Some(stats) => StatsResponse::Stats(stats),
        None => StatsResponse::NoData {
            message: "No flight data available",
        },
    })
}
