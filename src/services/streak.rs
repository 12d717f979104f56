use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::Row;

use crate::db::DatabaseProxy;

/// Computes the next streak count for a session on `today` (UTC calendar day).
/// Returns `None` when the streak was already advanced today; a repeat session
/// in the same day never inflates the counter.
pub fn transition(current: i32, last_active: Option<NaiveDate>, today: NaiveDate) -> Option<i32> {
    let Some(last) = last_active else {
        return Some(1);
    };

    if last == today {
        return None;
    }

    if Some(last) == today.checked_sub_days(Days::new(1)) {
        return Some(current + 1);
    }

    Some(1)
}

/// Advances the user's daily streak. The row lock serializes concurrent
/// sessions for the same user, so the read-modify-write cannot double
/// increment.
pub async fn advance(proxy: &DatabaseProxy, user_id: &str) -> Result<i32, sqlx::Error> {
    let mut tx = proxy.pool().begin().await?;

    let row = sqlx::query(
        "SELECT current_streak, last_streak_at FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let current: i32 = row.try_get("current_streak")?;
    let last_streak_at: Option<DateTime<Utc>> = row.try_get("last_streak_at")?;

    let now = Utc::now();
    let today = now.date_naive();

    match transition(current, last_streak_at.map(|at| at.date_naive()), today) {
        None => {
            tx.commit().await?;
            Ok(current)
        }
        Some(next) => {
            sqlx::query(
                "UPDATE users SET current_streak = $2, last_streak_at = $3, updated_at = $3 \
                 WHERE id = $1",
            )
            .bind(user_id)
            .bind(next)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_first_session_starts_at_one() {
        assert_eq!(transition(0, None, date(2025, 3, 10)), Some(1));
    }

    #[test]
    fn test_same_day_repeat_is_noop() {
        let today = date(2025, 3, 10);
        assert_eq!(transition(4, Some(today), today), None);
    }

    #[test]
    fn test_next_day_increments() {
        assert_eq!(
            transition(4, Some(date(2025, 3, 9)), date(2025, 3, 10)),
            Some(5)
        );
    }

    #[test]
    fn test_gap_resets_to_one() {
        assert_eq!(
            transition(9, Some(date(2025, 3, 7)), date(2025, 3, 10)),
            Some(1)
        );
    }

    #[test]
    fn test_increment_across_month_boundary() {
        assert_eq!(
            transition(2, Some(date(2025, 2, 28)), date(2025, 3, 1)),
            Some(3)
        );
    }
}
