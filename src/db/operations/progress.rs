use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub id: String,
    pub user_id: String,
    pub lesson_id: String,
    pub completed: bool,
    pub best_wpm: f64,
    pub best_accuracy: f64,
    pub attempts: i32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub lesson_id: String,
    #[serde(default)]
    pub wpm: f64,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub completed: bool,
}

const PROGRESS_COLUMNS: &str = "id, user_id, lesson_id, completed, best_wpm, best_accuracy, \
     attempts, last_attempt, created_at, updated_at";

fn progress_from_row(row: &PgRow) -> Result<Progress, sqlx::Error> {
    Ok(Progress {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        lesson_id: row.try_get("lesson_id")?,
        completed: row.try_get("completed")?,
        best_wpm: row.try_get("best_wpm")?,
        best_accuracy: row.try_get("best_accuracy")?,
        attempts: row.try_get("attempts")?,
        last_attempt: row.try_get("last_attempt")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// Best values only ever improve; attempts count every save.
pub async fn save_progress(
    proxy: &DatabaseProxy,
    req: &ProgressRequest,
) -> Result<Progress, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    let row = sqlx::query(&format!(
        "INSERT INTO progress (id, user_id, lesson_id, completed, best_wpm, best_accuracy, attempts, last_attempt) \
         VALUES ($1, $2, $3, $4, $5, $6, 1, NOW()) \
         ON CONFLICT (user_id, lesson_id) DO UPDATE SET \
             completed = progress.completed OR EXCLUDED.completed, \
             best_wpm = GREATEST(progress.best_wpm, EXCLUDED.best_wpm), \
             best_accuracy = GREATEST(progress.best_accuracy, EXCLUDED.best_accuracy), \
             attempts = progress.attempts + 1, \
             last_attempt = NOW(), \
             updated_at = NOW() \
         RETURNING {PROGRESS_COLUMNS}"
    ))
    .bind(&id)
    .bind(&req.user_id)
    .bind(&req.lesson_id)
    .bind(req.completed)
    .bind(req.wpm)
    .bind(req.accuracy)
    .fetch_one(proxy.pool())
    .await?;

    progress_from_row(&row)
}

pub async fn get_user_progress(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<Progress>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = $1 ORDER BY updated_at DESC"
    ))
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(progress_from_row).collect()
}

pub async fn get_lesson_progress(
    proxy: &DatabaseProxy,
    user_id: &str,
    lesson_id: &str,
) -> Result<Option<Progress>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = $1 AND lesson_id = $2"
    ))
    .bind(user_id)
    .bind(lesson_id)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(progress_from_row).transpose()
}
