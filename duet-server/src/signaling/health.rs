use crate::SignalingService;
use crate::hub::HubStats;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    #[serde(flatten)]
    stats: HubStats,
}

pub async fn health_handler(State(service): State<SignalingService>) -> Response {
    match service.stats().await {
        Some(stats) => Json(HealthReport {
            status: "ok",
            stats,
        })
        .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "hub is not running").into_response(),
    }
}
