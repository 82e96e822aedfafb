use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool, Row};
use uuid::Uuid;

use crate::engine::types::DailyStat;

/// Increments today's review counter and flips `dailyGoalAchieved` once the
/// configured goal is reached. Atomic upsert on the (userId, date) key so
/// concurrent reviews never lose counts. Takes any executor so it can run
/// inside the review transaction.
pub async fn record_review(
    executor: impl PgExecutor<'_>,
    user_id: &str,
    date: NaiveDate,
    daily_goal: i32,
) -> Result<DailyStat, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO "daily_stats" ("id","userId","date","wordsReviewed","dailyGoalAchieved","updatedAt")
        VALUES ($1, $2, $3, 1, 1 >= $4, NOW())
        ON CONFLICT ("userId","date") DO UPDATE SET
            "wordsReviewed" = "daily_stats"."wordsReviewed" + 1,
            "dailyGoalAchieved" = "daily_stats"."wordsReviewed" + 1 >= $4,
            "updatedAt" = NOW()
        RETURNING "date","wordsReviewed","dailyGoalAchieved"
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(date)
    .bind(daily_goal)
    .fetch_one(executor)
    .await?;

    Ok(map_stat_row(&row))
}

/// Daily aggregates on or after `since`, one row per day.
pub async fn stats_since(
    pool: &PgPool,
    user_id: &str,
    since: NaiveDate,
) -> Result<Vec<DailyStat>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "date","wordsReviewed","dailyGoalAchieved"
        FROM "daily_stats"
        WHERE "userId" = $1 AND "date" >= $2
        ORDER BY "date" DESC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(map_stat_row).collect())
}

fn map_stat_row(row: &sqlx::postgres::PgRow) -> DailyStat {
    DailyStat {
        date: row.try_get("date").unwrap_or_default(),
        words_reviewed: row
            .try_get::<i32, _>("wordsReviewed")
            .map(i64::from)
            .unwrap_or(0),
        daily_goal_achieved: row.try_get("dailyGoalAchieved").unwrap_or(false),
    }
}
