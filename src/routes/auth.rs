use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{self, AUTH_COOKIE_NAME, TOKEN_TTL_DAYS};
use crate::db::operations::users::{self, User};
use crate::response::AppError;
use crate::routes::{db_error, require_user};
use crate::services::badge;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    guest_id: Option<String>,
    #[serde(default)]
    github_username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    user: User,
    token: String,
}

fn cookie_is_secure() -> bool {
    std::env::var("COOKIE_SECURE").as_deref() != Ok("false")
}

fn auth_cookie(token: &str) -> Result<HeaderValue, AppError> {
    let max_age = TOKEN_TTL_DAYS * 24 * 60 * 60;
    let attributes = if cookie_is_secure() {
        "HttpOnly; Secure; SameSite=None"
    } else {
        "HttpOnly; SameSite=Lax"
    };
    let cookie = format!("{AUTH_COOKIE_NAME}={token}; Path=/; Max-Age={max_age}; {attributes}");

    HeaderValue::from_str(&cookie).map_err(|_| AppError::internal("invalid cookie value"))
}

fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; Path=/; Max-Age=0; HttpOnly")
}

pub async fn create_guest(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::create_guest_user(state.db_proxy())
        .await
        .map_err(db_error)?;

    let token = auth::sign_token(&user.id, &user.username, true)
        .map_err(|_| AppError::internal("failed to generate token"))?;
    let cookie = auth_cookie(&token)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthResponse { user, token }),
    ))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let proxy = state.db_proxy();

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Username and password are required"));
    }
    auth::validate_username(&username).map_err(AppError::bad_request)?;
    auth::validate_password(&req.password).map_err(AppError::bad_request)?;

    if users::get_user_by_username(proxy, &username)
        .await
        .map_err(db_error)?
        .is_some()
    {
        return Err(AppError::conflict("Username already exists"));
    }

    if !email.is_empty()
        && users::get_user_by_email(proxy, &email)
            .await
            .map_err(db_error)?
            .is_some()
    {
        return Err(AppError::conflict("Email already exists"));
    }

    let password_hash = auth::hash_password(&req.password)
        .map_err(|_| AppError::internal("failed to process password"))?;

    let email_opt = (!email.is_empty()).then_some(email.as_str());
    let github = req.github_username.as_deref().filter(|v| !v.is_empty());

    let user = match req.guest_id.as_deref().filter(|id| !id.is_empty()) {
        Some(guest_id) => users::convert_guest_to_registered(
            proxy,
            guest_id,
            &username,
            email_opt,
            &password_hash,
            &username,
            github,
        )
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::not_found("Guest user not found"))?,
        None => users::create_registered_user(
            proxy,
            &username,
            email_opt,
            &password_hash,
            &username,
            github,
        )
        .await
        .map_err(db_error)?,
    };

    badge::on_register(proxy, &user.id, user.created_at).await;

    let token = auth::sign_token(&user.id, &user.username, false)
        .map_err(|_| AppError::internal("failed to generate token"))?;
    let cookie = auth_cookie(&token)?;

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthResponse { user, token }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let proxy = state.db_proxy();
    let username = req.username.trim();

    let user = users::get_user_by_username(proxy, username)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let hash = users::get_password_hash(proxy, username)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !auth::check_password(&req.password, &hash) {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = auth::sign_token(&user.id, &user.username, user.is_guest)
        .map_err(|_| AppError::internal("failed to generate token"))?;
    let cookie = auth_cookie(&token)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthResponse { user, token }),
    ))
}

pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, clear_cookie())]),
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let claims = require_user(&headers)?;

    let user = users::get_user_by_id(state.db_proxy(), &claims.user_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user))
}
