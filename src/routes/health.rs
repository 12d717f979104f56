use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    lessons: usize,
    database: &'static str,
    uptime: u64,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = state.db_proxy().ping().await;

    let response = HealthResponse {
        status: if db_ok { "ok" } else { "degraded" },
        service: "typer-backend",
        lessons: state.content().count(),
        database: if db_ok { "connected" } else { "disconnected" },
        uptime: state.uptime_seconds(),
    };

    let status_code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
