use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::db::operations::metrics::{self, UserMetricsSummary};
use crate::db::operations::progress::{self, Progress};
use crate::db::operations::users::{self, User};
use crate::response::AppError;
use crate::routes::db_error;
use crate::services::ranking::{self, Period};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    user: User,
    metrics: UserMetricsSummary,
    progress: Vec<Progress>,
    completed_lessons: usize,
    total_points: i64,
}

pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let proxy = state.db_proxy();

    let user = users::get_user_by_id(proxy, &user_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let metrics = metrics::user_metrics_summary(proxy, &user_id)
        .await
        .map_err(db_error)?;

    let progress = progress::get_user_progress(proxy, &user_id)
        .await
        .map_err(db_error)?;

    let completed_lessons = progress.iter().filter(|record| record.completed).count();

    let total_points = ranking::user_points(proxy, &user_id, ranking::window(Period::AllTime))
        .await
        .map_err(db_error)?;

    Ok(Json(UserProfile {
        user,
        metrics,
        progress,
        completed_lessons,
        total_points,
    }))
}
