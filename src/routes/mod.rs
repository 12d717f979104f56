mod auth;
mod badges;
mod health;
mod leaderboard;
mod lessons;
mod metrics;
mod progress;
mod users;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::auth::Claims;
use crate::response::{json_error, AppError};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/guest", post(auth::create_guest))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/languages", get(lessons::languages))
        .route("/lessons", get(lessons::list))
        .route("/lessons/:id", get(lessons::get_by_id))
        .route("/lessons/language/:language", get(lessons::by_language))
        .route("/progress", post(progress::save))
        .route("/progress/:userId", get(progress::for_user))
        .route("/progress/:userId/:lessonId", get(progress::for_lesson))
        .route("/metrics", post(metrics::save))
        .route("/metrics/:userId", get(metrics::summary))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/leaderboard/rank", get(leaderboard::get_user_rank))
        .route("/badges", get(badges::list).post(badges::create))
        .route(
            "/users/:userId/badges/:badgeId",
            post(badges::assign).delete(badges::remove),
        )
        .route("/users/:userId", get(users::profile))
        .route("/health", get(health::health));

    Router::new()
        .nest("/api/v1", api)
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}

// Stateless auth: the token carries identity; no session row is consulted.
pub(crate) fn require_user(headers: &HeaderMap) -> Result<Claims, AppError> {
    let token = crate::auth::extract_token(headers)
        .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;

    crate::auth::verify_token(&token).map_err(|_| AppError::unauthorized("Not authenticated"))
}

pub(crate) fn db_error(err: sqlx::Error) -> AppError {
    tracing::error!(error = %err, "database query failed");
    AppError::internal("database query failed")
}
