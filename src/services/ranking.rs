use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::Serialize;
use sqlx::Row;

use crate::db::DatabaseProxy;
use crate::services::badge::{self, BadgeWithDetails};

/// Leaderboard time windows. All boundaries are UTC; `end` carries a small
/// forward buffer to tolerate clock skew between writer and reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    AllTime,
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn parse(s: &str) -> Self {
        match s {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            _ => Self::AllTime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllTime => "all_time",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// Half-open interval `[start, end)` over the point ledger.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub fn window(period: Period) -> Window {
    window_at(period, Utc::now())
}

fn window_at(period: Period, now: DateTime<Utc>) -> Window {
    let end = now + Duration::minutes(1);
    let today = now.date_naive();

    let start = match period {
        Period::AllTime => DateTime::<Utc>::UNIX_EPOCH,
        Period::Daily => day_start(today),
        Period::Weekly => day_start(today.week(Weekday::Mon).first_day()),
        Period::Monthly => day_start(today.with_day(1).unwrap_or(today)),
    };

    Window { start, end }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    pub points: i64,
    pub rank: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<BadgeWithDetails>,
}

#[derive(Debug, Clone)]
struct TotalRow {
    user_id: String,
    username: String,
    github_username: Option<String>,
    points: i64,
}

// Display ranks are sequential output positions; tied totals still get
// distinct ranks. Single-user rank queries use competition ranking instead,
// see `competition_rank`.
fn with_positions(rows: Vec<TotalRow>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| LeaderboardEntry {
            user_id: row.user_id,
            username: row.username,
            github_username: row.github_username,
            points: row.points,
            rank: index as i64 + 1,
            badges: Vec::new(),
        })
        .collect()
}

/// Rank of `user_id` among `totals`: one plus the number of other users with
/// a strictly greater total. A user absent from the window has zero points
/// and still gets a rank.
pub fn competition_rank(user_id: &str, totals: &[(String, i64)]) -> i64 {
    let user_points = totals
        .iter()
        .find(|(id, _)| id == user_id)
        .map(|(_, points)| *points)
        .unwrap_or(0);

    let greater = totals
        .iter()
        .filter(|(id, points)| id != user_id && *points > user_points)
        .count();

    greater as i64 + 1
}

pub async fn leaderboard(
    proxy: &DatabaseProxy,
    window: Window,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT pt.user_id, u.display_name, u.github_username, SUM(pt.points)::BIGINT AS total_points \
         FROM point_transactions pt \
         JOIN users u ON u.id = pt.user_id \
         WHERE pt.created_at >= $1 AND pt.created_at < $2 \
         GROUP BY pt.user_id, u.display_name, u.github_username \
         ORDER BY total_points DESC \
         LIMIT $3",
    )
    .bind(window.start)
    .bind(window.end)
    .bind(limit)
    .fetch_all(proxy.pool())
    .await?;

    let totals: Vec<TotalRow> = rows
        .iter()
        .map(|row| {
            Ok(TotalRow {
                user_id: row.try_get("user_id")?,
                username: row.try_get("display_name")?,
                github_username: row.try_get("github_username")?,
                points: row.try_get("total_points")?,
            })
        })
        .collect::<Result<_, sqlx::Error>>()?;

    let mut entries = with_positions(totals);
    for entry in &mut entries {
        entry.badges = badge::get_user_badges(proxy, &entry.user_id).await?;
    }

    Ok(entries)
}

pub async fn user_rank(
    proxy: &DatabaseProxy,
    user_id: &str,
    window: Window,
) -> Result<i64, sqlx::Error> {
    let totals = window_totals(proxy, window).await?;
    Ok(competition_rank(user_id, &totals))
}

pub async fn user_points(
    proxy: &DatabaseProxy,
    user_id: &str,
    window: Window,
) -> Result<i64, sqlx::Error> {
    let points: Option<i64> = sqlx::query_scalar(
        "SELECT SUM(points)::BIGINT FROM point_transactions \
         WHERE user_id = $1 AND created_at >= $2 AND created_at < $3",
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_one(proxy.pool())
    .await?;

    Ok(points.unwrap_or(0))
}

async fn window_totals(
    proxy: &DatabaseProxy,
    window: Window,
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT user_id, SUM(points)::BIGINT AS total_points \
         FROM point_transactions \
         WHERE created_at >= $1 AND created_at < $2 \
         GROUP BY user_id",
    )
    .bind(window.start)
    .bind(window.end)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| Ok((row.try_get("user_id")?, row.try_get("total_points")?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn totals(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs
            .iter()
            .map(|(id, points)| (id.to_string(), *points))
            .collect()
    }

    #[test]
    fn test_period_parse_defaults_to_all_time() {
        assert_eq!(Period::parse("daily"), Period::Daily);
        assert_eq!(Period::parse("weekly"), Period::Weekly);
        assert_eq!(Period::parse("monthly"), Period::Monthly);
        assert_eq!(Period::parse(""), Period::AllTime);
        assert_eq!(Period::parse("yearly"), Period::AllTime);
    }

    #[test]
    fn test_daily_window_starts_at_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 15, 30, 45).unwrap();
        let window = window_at(Period::Daily, now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 12, 0, 0, 0).unwrap());
        assert_eq!(window.end, now + Duration::minutes(1));
    }

    #[test]
    fn test_weekly_window_starts_on_monday() {
        // 2025-03-12 is a Wednesday; the week began Monday 2025-03-10.
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 15, 30, 45).unwrap();
        let window = window_at(Period::Weekly, now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_window_on_sunday_reaches_back_six_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 16, 1, 0, 0).unwrap();
        let window = window_at(Period::Weekly, now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_monthly_window_starts_on_the_first() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 15, 30, 45).unwrap();
        let window = window_at(Period::Monthly, now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_all_time_window_starts_at_epoch() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 15, 30, 45).unwrap();
        let window = window_at(Period::AllTime, now);
        assert_eq!(window.start, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_positions_are_sequential_even_when_tied() {
        let rows = vec![
            TotalRow {
                user_id: "a".into(),
                username: "a".into(),
                github_username: None,
                points: 100,
            },
            TotalRow {
                user_id: "b".into(),
                username: "b".into(),
                github_username: None,
                points: 100,
            },
            TotalRow {
                user_id: "c".into(),
                username: "c".into(),
                github_username: None,
                points: 50,
            },
        ];

        let entries = with_positions(rows);
        let ranks: Vec<i64> = entries.iter().map(|entry| entry.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_competition_rank_shares_rank_on_ties() {
        let totals = totals(&[("a", 100), ("b", 100), ("c", 50)]);
        assert_eq!(competition_rank("a", &totals), 1);
        assert_eq!(competition_rank("b", &totals), 1);
        assert_eq!(competition_rank("c", &totals), 3);
    }

    #[test]
    fn test_competition_rank_counts_strictly_greater() {
        let totals = totals(&[("a", 300), ("b", 200), ("c", 100)]);
        assert_eq!(competition_rank("b", &totals), 2);
        assert_eq!(competition_rank("c", &totals), 3);
    }

    #[test]
    fn test_competition_rank_for_absent_user_is_behind_scorers() {
        let totals = totals(&[("a", 10)]);
        assert_eq!(competition_rank("ghost", &totals), 2);
    }

    #[test]
    fn test_competition_rank_in_empty_window_is_one() {
        assert_eq!(competition_rank("anyone", &[]), 1);
    }
}
