use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::DatabaseProxy;

pub const BETA_TESTER: &str = "Beta Tester";
pub const EARLY_ACCESS: &str = "Early Access";

const BETA_TESTER_LIMIT: i64 = 100;
const EARLY_ACCESS_LIMIT: i64 = 1000;

const DEFAULT_BADGES: &[(&str, &str)] = &[
    (BETA_TESTER, "#FFD700"),
    (EARLY_ACCESS, "#C0C0C0"),
    ("Donator", "#FF69B4"),
    ("Contributor", "#32CD32"),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeWithDetails {
    pub badge: Badge,
    pub assigned_at: DateTime<Utc>,
}

fn badge_from_row(row: &PgRow) -> Result<Badge, sqlx::Error> {
    Ok(Badge {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Badge names earned by the nth registered user, given how many registered
/// users existed before them.
pub fn registration_badges(prior_registered: i64) -> Vec<&'static str> {
    let mut earned = Vec::new();
    if prior_registered < BETA_TESTER_LIMIT {
        earned.push(BETA_TESTER);
    }
    if prior_registered < EARLY_ACCESS_LIMIT {
        earned.push(EARLY_ACCESS);
    }
    earned
}

/// Grants registration-order badges to a newly registered user. Failures are
/// logged and swallowed; registration must not roll back over a badge.
pub async fn on_register(proxy: &DatabaseProxy, user_id: &str, created_at: DateTime<Utc>) {
    if let Err(err) = grant_registration_badges(proxy, user_id, created_at).await {
        tracing::warn!(error = %err, user_id, "failed to assign registration badges");
    }
}

async fn grant_registration_badges(
    proxy: &DatabaseProxy,
    user_id: &str,
    created_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let prior: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE is_guest = FALSE AND created_at < $1",
    )
    .bind(created_at)
    .fetch_one(proxy.pool())
    .await?;

    for name in registration_badges(prior) {
        let Some(badge) = get_badge_by_name(proxy, name).await? else {
            tracing::warn!(badge = name, "registration badge is not seeded");
            continue;
        };
        assign_badge(proxy, user_id, &badge.id).await?;
    }

    Ok(())
}

/// Seeds the fixed badge catalog; safe to run on every startup.
pub async fn ensure_default_badges(proxy: &DatabaseProxy) -> Result<(), sqlx::Error> {
    for (name, color) in DEFAULT_BADGES {
        sqlx::query(
            "INSERT INTO badges (id, name, color) VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(color)
        .execute(proxy.pool())
        .await?;
    }
    Ok(())
}

pub async fn create_badge(
    proxy: &DatabaseProxy,
    name: &str,
    color: &str,
) -> Result<Badge, sqlx::Error> {
    let id = Uuid::new_v4().to_string();

    let row = sqlx::query(
        "INSERT INTO badges (id, name, color) VALUES ($1, $2, $3) \
         RETURNING id, name, color, created_at, updated_at",
    )
    .bind(&id)
    .bind(name)
    .bind(color)
    .fetch_one(proxy.pool())
    .await?;

    badge_from_row(&row)
}

pub async fn get_all_badges(proxy: &DatabaseProxy) -> Result<Vec<Badge>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, name, color, created_at, updated_at FROM badges ORDER BY created_at",
    )
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(badge_from_row).collect()
}

pub async fn get_badge_by_name(
    proxy: &DatabaseProxy,
    name: &str,
) -> Result<Option<Badge>, sqlx::Error> {
    let row = sqlx::query("SELECT id, name, color, created_at, updated_at FROM badges WHERE name = $1")
        .bind(name)
        .fetch_optional(proxy.pool())
        .await?;

    row.as_ref().map(badge_from_row).transpose()
}

/// Idempotent: re-assigning an already held badge is a no-op.
pub async fn assign_badge(
    proxy: &DatabaseProxy,
    user_id: &str,
    badge_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_badges (user_id, badge_id) VALUES ($1, $2) \
         ON CONFLICT (user_id, badge_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(badge_id)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

pub async fn remove_badge(
    proxy: &DatabaseProxy,
    user_id: &str,
    badge_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_badges WHERE user_id = $1 AND badge_id = $2")
        .bind(user_id)
        .bind(badge_id)
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub async fn get_user_badges(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<BadgeWithDetails>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT b.id, b.name, b.color, b.created_at, b.updated_at, ub.assigned_at \
         FROM badges b \
         JOIN user_badges ub ON b.id = ub.badge_id \
         WHERE ub.user_id = $1 \
         ORDER BY ub.assigned_at",
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| {
            Ok(BadgeWithDetails {
                badge: badge_from_row(row)?,
                assigned_at: row.try_get("assigned_at")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fiftieth_registrant_gets_both_badges() {
        assert_eq!(registration_badges(49), vec![BETA_TESTER, EARLY_ACCESS]);
    }

    #[test]
    fn test_five_hundredth_registrant_gets_early_access_only() {
        assert_eq!(registration_badges(499), vec![EARLY_ACCESS]);
    }

    #[test]
    fn test_late_registrant_gets_nothing() {
        assert!(registration_badges(1499).is_empty());
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(registration_badges(99), vec![BETA_TESTER, EARLY_ACCESS]);
        assert_eq!(registration_badges(100), vec![EARLY_ACCESS]);
        assert_eq!(registration_badges(999), vec![EARLY_ACCESS]);
        assert!(registration_badges(1000).is_empty());
    }
}
