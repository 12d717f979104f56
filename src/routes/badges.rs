use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::response::AppError;
use crate::routes::{db_error, require_user};
use crate::services::badge;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBadgeRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: String,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBadgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    if req.name.is_empty() || req.color.is_empty() {
        return Err(AppError::bad_request("name and color are required"));
    }

    let created = badge::create_badge(state.db_proxy(), &req.name, &req.color)
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let badges = badge::get_all_badges(state.db_proxy())
        .await
        .map_err(db_error)?;

    Ok(Json(badges))
}

pub async fn assign(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((user_id, badge_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    badge::assign_badge(state.db_proxy(), &user_id, &badge_id)
        .await
        .map_err(db_error)?;

    Ok(Json(serde_json::json!({
        "message": "Badge assigned successfully"
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((user_id, badge_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    badge::remove_badge(state.db_proxy(), &user_id, &badge_id)
        .await
        .map_err(db_error)?;

    Ok(Json(serde_json::json!({
        "message": "Badge removed successfully"
    })))
}
