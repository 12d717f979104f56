use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DatabaseProxy;

pub const REASON_LESSON_COMPLETE: &str = "lesson_complete";

/// Point award policy for a completed typing session.
///
/// Sessions below the accuracy threshold earn nothing; careless speed does not
/// pay. Above it, correct characters earn the base rate, boosted linearly by
/// WPM and dampened quadratically by accuracy.
#[derive(Debug, Clone, Copy)]
pub struct ScorePolicy {
    pub base_points_per_char: f64,
    pub accuracy_threshold: f64,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            base_points_per_char: 1.0,
            accuracy_threshold: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionMetrics {
    pub wpm: f64,
    pub accuracy: f64,
    pub correct_chars: i64,
}

impl ScorePolicy {
    pub fn score(&self, metrics: &SessionMetrics) -> i64 {
        if metrics.accuracy < self.accuracy_threshold {
            return 0;
        }

        let base = metrics.correct_chars as f64 * self.base_points_per_char;

        // 60 WPM -> 1.6x, 100 WPM -> 2.0x; no upper cap.
        let speed_multiplier = 1.0 + metrics.wpm / 100.0;

        let accuracy_ratio = metrics.accuracy / 100.0;
        let accuracy_multiplier = accuracy_ratio * accuracy_ratio;

        let final_score = base * speed_multiplier * accuracy_multiplier;

        (final_score.floor() as i64).max(0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointTransaction {
    pub id: String,
    pub user_id: String,
    pub source_id: String,
    pub points: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Appends one event to the point ledger. The ledger is the only source of
/// truth for totals; nothing is denormalized onto the user row.
pub async fn record_point_event(
    proxy: &DatabaseProxy,
    user_id: &str,
    source_id: &str,
    points: i64,
    reason: &str,
) -> Result<PointTransaction, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    let created_at: DateTime<Utc> = sqlx::query_scalar(
        "INSERT INTO point_transactions (id, user_id, source_id, points, reason) \
         VALUES ($1, $2, $3, $4, $5) RETURNING created_at",
    )
    .bind(&id)
    .bind(user_id)
    .bind(source_id)
    .bind(points)
    .bind(reason)
    .fetch_one(proxy.pool())
    .await?;

    Ok(PointTransaction {
        id,
        user_id: user_id.to_string(),
        source_id: source_id.to_string(),
        points,
        reason: reason.to_string(),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(wpm: f64, accuracy: f64, correct_chars: i64) -> SessionMetrics {
        SessionMetrics {
            wpm,
            accuracy,
            correct_chars,
        }
    }

    #[test]
    fn test_below_accuracy_threshold_scores_zero() {
        let policy = ScorePolicy::default();
        assert_eq!(policy.score(&metrics(120.0, 79.9, 500)), 0);
        assert_eq!(policy.score(&metrics(40.0, 0.0, 500)), 0);
    }

    #[test]
    fn test_reference_session() {
        // 100 correct chars at 60 WPM / 90% accuracy:
        // base=100, speed=1.6, accuracy=0.81 -> floor(129.6) = 129
        let policy = ScorePolicy::default();
        assert_eq!(policy.score(&metrics(60.0, 90.0, 100)), 129);
    }

    #[test]
    fn test_perfect_accuracy_keeps_base_times_speed() {
        let policy = ScorePolicy::default();
        assert_eq!(policy.score(&metrics(100.0, 100.0, 50)), 100);
    }

    #[test]
    fn test_deterministic() {
        let policy = ScorePolicy::default();
        let m = metrics(87.3, 93.4, 417);
        assert_eq!(policy.score(&m), policy.score(&m));
    }

    #[test]
    fn test_monotonic_in_chars_and_wpm() {
        let policy = ScorePolicy::default();
        assert!(policy.score(&metrics(60.0, 90.0, 200)) >= policy.score(&metrics(60.0, 90.0, 100)));
        assert!(policy.score(&metrics(90.0, 90.0, 100)) >= policy.score(&metrics(60.0, 90.0, 100)));
    }

    #[test]
    fn test_never_negative() {
        let policy = ScorePolicy::default();
        assert_eq!(policy.score(&metrics(0.0, 80.0, 0)), 0);
    }
}
