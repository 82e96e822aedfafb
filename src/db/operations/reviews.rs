use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Row};
use uuid::Uuid;

use crate::engine::types::{ReviewAction, WindowEvent};

/// Appends one immutable review fact. `increase_applied` records the level
/// delta the engine produced for this event (0 for review-needed marks) so
/// average daily gain can be aggregated without replaying engine history.
/// Takes any executor so it can run inside the review transaction.
pub async fn insert_event(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    item_id: &str,
    action: ReviewAction,
    increase_applied: i32,
    reviewed_at: DateTime<Utc>,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO "review_events" ("id","userId","itemId","action","increaseApplied","reviewedAt")
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(item_id)
    .bind(action.as_str())
    .bind(increase_applied)
    .bind(reviewed_at)
    .execute(executor)
    .await?;

    Ok(id)
}

/// Events for this (user, item) since `since`, newest-first, as the engine's
/// window type. Rows with an unknown action tag are skipped.
pub async fn recent_window(
    pool: &PgPool,
    user_id: &str,
    item_id: &str,
    since: DateTime<Utc>,
) -> Result<Vec<WindowEvent>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "action", "reviewedAt"
        FROM "review_events"
        WHERE "userId" = $1 AND "itemId" = $2 AND "reviewedAt" >= $3
        ORDER BY "reviewedAt" DESC
        "#,
    )
    .bind(user_id)
    .bind(item_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let action = row
                .try_get::<String, _>("action")
                .ok()
                .as_deref()
                .and_then(ReviewAction::parse)?;
            let reviewed_at = row.try_get("reviewedAt").ok()?;
            Some(WindowEvent {
                action,
                reviewed_at,
            })
        })
        .collect())
}

/// Sum of applied increases for this (user, item) since `since`.
pub async fn sum_increase_since(
    pool: &PgPool,
    user_id: &str,
    item_id: &str,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COALESCE(SUM("increaseApplied"), 0)::bigint AS "total"
        FROM "review_events"
        WHERE "userId" = $1 AND "itemId" = $2 AND "reviewedAt" >= $3
        "#,
    )
    .bind(user_id)
    .bind(item_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(row.try_get::<i64, _>("total").unwrap_or(0))
}

pub async fn delete_events_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM "review_events" WHERE "reviewedAt" < $1"#)
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() as i64)
}
