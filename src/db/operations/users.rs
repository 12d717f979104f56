use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::DatabaseProxy;
use crate::services::badge::{self, BadgeWithDetails};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    pub is_guest: bool,
    pub current_streak: i32,
    pub last_streak_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<BadgeWithDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, username, email, display_name, github_username, is_guest, \
     current_streak, last_streak_at, created_at, updated_at";

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        github_username: row.try_get("github_username")?,
        is_guest: row.try_get("is_guest")?,
        current_streak: row.try_get("current_streak")?,
        last_streak_at: row.try_get("last_streak_at")?,
        badges: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn create_guest_user(proxy: &DatabaseProxy) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let username = format!("guest_{:07}", rand::rng().random_range(0..10_000_000u32));

    let row = sqlx::query(&format!(
        "INSERT INTO users (id, username, display_name, is_guest) \
         VALUES ($1, $2, $2, TRUE) RETURNING {USER_COLUMNS}"
    ))
    .bind(&id)
    .bind(&username)
    .fetch_one(proxy.pool())
    .await?;

    user_from_row(&row)
}

pub async fn create_registered_user(
    proxy: &DatabaseProxy,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
    display_name: &str,
    github_username: Option<&str>,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    let row = sqlx::query(&format!(
        "INSERT INTO users (id, username, email, password_hash, display_name, github_username, is_guest) \
         VALUES ($1, $2, $3, $4, $5, $6, FALSE) RETURNING {USER_COLUMNS}"
    ))
    .bind(&id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(github_username)
    .fetch_one(proxy.pool())
    .await?;

    user_from_row(&row)
}

pub async fn convert_guest_to_registered(
    proxy: &DatabaseProxy,
    guest_id: &str,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
    display_name: &str,
    github_username: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "UPDATE users \
         SET username = $2, email = $3, password_hash = $4, display_name = $5, \
             github_username = $6, is_guest = FALSE, updated_at = NOW() \
         WHERE id = $1 AND is_guest = TRUE RETURNING {USER_COLUMNS}"
    ))
    .bind(guest_id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(github_username)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn get_user_by_id(
    proxy: &DatabaseProxy,
    id: &str,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(proxy.pool())
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut user = user_from_row(&row)?;
    user.badges = badge::get_user_badges(proxy, id).await?;
    Ok(Some(user))
}

pub async fn get_user_by_username(
    proxy: &DatabaseProxy,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn get_user_by_email(
    proxy: &DatabaseProxy,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(proxy.pool())
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn get_password_hash(
    proxy: &DatabaseProxy,
    username: &str,
) -> Result<Option<String>, sqlx::Error> {
    let hash: Option<Option<String>> =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(proxy.pool())
            .await?;

    Ok(hash.flatten())
}
