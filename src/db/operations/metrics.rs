use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub expected: String,
    pub typed: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingMetrics {
    pub id: String,
    pub user_id: String,
    pub lesson_id: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub total_time: f64,
    pub total_chars: i32,
    pub correct_chars: i32,
    pub incorrect_chars: i32,
    pub common_errors: Vec<ErrorEntry>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub lesson_id: String,
    #[serde(default)]
    pub wpm: f64,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub total_chars: i32,
    #[serde(default)]
    pub correct_chars: i32,
    #[serde(default)]
    pub incorrect_chars: i32,
    #[serde(default)]
    pub common_errors: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetricsSummary {
    pub user_id: String,
    pub average_wpm: f64,
    pub average_accuracy: f64,
    pub total_sessions: i64,
    pub total_time: f64,
    pub best_wpm: f64,
}

pub async fn save_metrics(
    proxy: &DatabaseProxy,
    req: &MetricsRequest,
) -> Result<TypingMetrics, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        "INSERT INTO typing_metrics \
         (id, user_id, lesson_id, wpm, accuracy, total_time, total_chars, correct_chars, incorrect_chars, common_errors) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING created_at",
    )
    .bind(&id)
    .bind(&req.user_id)
    .bind(&req.lesson_id)
    .bind(req.wpm)
    .bind(req.accuracy)
    .bind(req.total_time)
    .bind(req.total_chars)
    .bind(req.correct_chars)
    .bind(req.incorrect_chars)
    .bind(Json(&req.common_errors))
    .fetch_one(proxy.pool())
    .await?;

    Ok(TypingMetrics {
        id,
        user_id: req.user_id.clone(),
        lesson_id: req.lesson_id.clone(),
        wpm: req.wpm,
        accuracy: req.accuracy,
        total_time: req.total_time,
        total_chars: req.total_chars,
        correct_chars: req.correct_chars,
        incorrect_chars: req.incorrect_chars,
        common_errors: req.common_errors.clone(),
        created_at,
    })
}

pub async fn user_metrics_summary(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<UserMetricsSummary, sqlx::Error> {
    let row = sqlx::query(
        "SELECT \
             COALESCE(AVG(wpm), 0) AS average_wpm, \
             COALESCE(AVG(accuracy), 0) AS average_accuracy, \
             COUNT(*) AS total_sessions, \
             COALESCE(SUM(total_time), 0) AS total_time, \
             COALESCE(MAX(wpm), 0) AS best_wpm \
         FROM typing_metrics WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(proxy.pool())
    .await?;

    Ok(UserMetricsSummary {
        user_id: user_id.to_string(),
        average_wpm: row.try_get("average_wpm")?,
        average_accuracy: row.try_get("average_accuracy")?,
        total_sessions: row.try_get("total_sessions")?,
        total_time: row.try_get("total_time")?,
        best_wpm: row.try_get("best_wpm")?,
    })
}
