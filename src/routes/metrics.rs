use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::db::operations::metrics::{self, MetricsRequest, TypingMetrics};
use crate::response::AppError;
use crate::routes::{db_error, require_user};
use crate::services::points::{self, ScorePolicy, SessionMetrics};
use crate::services::streak;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    metrics: TypingMetrics,
    points_earned: i64,
    current_streak: i32,
}

/// Records a completed typing session: persists the raw metrics, awards
/// points to the ledger, and advances the daily streak. Points and streak are
/// independent facts; a failure in either does not void the session.
pub async fn save(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MetricsRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    if req.user_id.is_empty() || req.lesson_id.is_empty() {
        return Err(AppError::bad_request("userId and lessonId are required"));
    }

    let proxy = state.db_proxy();
    let saved = metrics::save_metrics(proxy, &req).await.map_err(db_error)?;

    let points_earned = ScorePolicy::default().score(&SessionMetrics {
        wpm: saved.wpm,
        accuracy: saved.accuracy,
        correct_chars: saved.correct_chars as i64,
    });

    if points_earned > 0 {
        if let Err(err) = points::record_point_event(
            proxy,
            &saved.user_id,
            &saved.lesson_id,
            points_earned,
            points::REASON_LESSON_COMPLETE,
        )
        .await
        {
            tracing::warn!(error = %err, user_id = %saved.user_id, "failed to record point event");
        }
    }

    let current_streak = match streak::advance(proxy, &saved.user_id).await {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!(error = %err, user_id = %saved.user_id, "failed to update streak");
            0
        }
    };

    Ok(Json(SessionResult {
        metrics: saved,
        points_earned,
        current_streak,
    }))
}

pub async fn summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&headers)?;

    let summary = metrics::user_metrics_summary(state.db_proxy(), &user_id)
        .await
        .map_err(db_error)?;

    Ok(Json(summary))
}
