use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use crate::db::operations::progress::{self, ProgressRequest};
use crate::response::AppError;
use crate::routes::{db_error, require_user};
use crate::state::AppState;

pub async fn save(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    if req.user_id.is_empty() || req.lesson_id.is_empty() {
        return Err(AppError::bad_request("userId and lessonId are required"));
    }

    let saved = progress::save_progress(state.db_proxy(), &req)
        .await
        .map_err(db_error)?;

    Ok(Json(saved))
}

pub async fn for_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    let records = progress::get_user_progress(state.db_proxy(), &user_id)
        .await
        .map_err(db_error)?;

    Ok(Json(records))
}

pub async fn for_lesson(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((user_id, lesson_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    let record = progress::get_lesson_progress(state.db_proxy(), &user_id, &lesson_id)
        .await
        .map_err(db_error)?;

    match record {
        Some(record) => Ok(Json(record).into_response()),
        // No attempt yet is a normal outcome, not a 404.
        None => Ok(Json(serde_json::json!({
            "userId": user_id,
            "lessonId": lesson_id,
            "completed": false,
            "attempts": 0,
        }))
        .into_response()),
    }
}
