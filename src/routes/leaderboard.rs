use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::AppError;
use crate::routes::{db_error, require_user};
use crate::services::ranking::{self, Period};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    period: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRankResponse {
    daily_rank: i64,
    weekly_rank: i64,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period = Period::parse(query.period.as_deref().unwrap_or_default());
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let entries = ranking::leaderboard(state.db_proxy(), ranking::window(period), limit)
        .await
        .map_err(db_error)?;

    Ok(Json(entries))
}

pub async fn get_user_rank(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let claims = require_user(&headers)?;
    let proxy = state.db_proxy();

    let daily_rank = ranking::user_rank(proxy, &claims.user_id, ranking::window(Period::Daily))
        .await
        .map_err(db_error)?;

    let weekly_rank = ranking::user_rank(proxy, &claims.user_id, ranking::window(Period::Weekly))
        .await
        .map_err(db_error)?;

    Ok(Json(UserRankResponse {
        daily_rank,
        weekly_rank,
    }))
}
