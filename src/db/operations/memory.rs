use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool, Row};
use uuid::Uuid;

use crate::engine::types::STARRED_LEVEL;

/// One (user, item) memory row. `version` backs the optimistic-concurrency
/// guard on every level-changing write.
#[derive(Debug, Clone)]
pub struct ItemMemoryRecord {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub memory_level: i32,
    pub is_quick_learner: bool,
    pub is_archived: bool,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub last_memory_update_at: Option<DateTime<Utc>>,
    pub last_decayed_on: Option<NaiveDate>,
    pub version: i64,
}

const RECORD_COLUMNS: &str = r#"
    "id","userId","itemId","memoryLevel","isQuickLearner","isArchived",
    "lastReviewedAt","lastMemoryUpdateAt","lastDecayedOn","version"
"#;

pub async fn get_record(
    pool: &PgPool,
    user_id: &str,
    item_id: &str,
) -> Result<Option<ItemMemoryRecord>, sqlx::Error> {
    let sql = format!(
        r#"SELECT {RECORD_COLUMNS} FROM "item_memory" WHERE "userId" = $1 AND "itemId" = $2 LIMIT 1"#,
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| map_record_row(&row)))
}

/// Creates the record at level 0 if absent, then returns the current row.
/// Concurrent creation is resolved by the unique (userId, itemId) key.
pub async fn ensure_record(
    pool: &PgPool,
    user_id: &str,
    item_id: &str,
) -> Result<ItemMemoryRecord, sqlx::Error> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO "item_memory" ("id","userId","itemId","createdAt","updatedAt")
        VALUES ($1, $2, $3, $4, $4)
        ON CONFLICT ("userId","itemId") DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(item_id)
    .bind(now)
    .execute(pool)
    .await?;

    let sql = format!(
        r#"SELECT {RECORD_COLUMNS} FROM "item_memory" WHERE "userId" = $1 AND "itemId" = $2 LIMIT 1"#,
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(item_id)
        .fetch_one(pool)
        .await?;

    Ok(map_record_row(&row))
}

/// Version-guarded write of a review outcome. Returns false when another
/// writer (a racing review or the decay batch) bumped the version first;
/// callers must re-read and recompute rather than overwrite. Takes any
/// executor so it can run inside the review transaction.
pub async fn update_memory_guarded(
    executor: impl PgExecutor<'_>,
    record_id: &str,
    expected_version: i64,
    new_level: i32,
    is_quick_learner: bool,
    reviewed_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE "item_memory"
        SET "memoryLevel" = $1,
            "isQuickLearner" = $2,
            "lastReviewedAt" = $3,
            "lastMemoryUpdateAt" = $3,
            "version" = "version" + 1,
            "updatedAt" = $3
        WHERE "id" = $4 AND "version" = $5
        "#,
    )
    .bind(new_level)
    .bind(is_quick_learner)
    .bind(reviewed_at)
    .bind(record_id)
    .bind(expected_version)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// A review-needed mark leaves the level alone and only refreshes the
/// review timestamp.
pub async fn touch_reviewed(
    executor: impl PgExecutor<'_>,
    record_id: &str,
    reviewed_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE "item_memory"
        SET "lastReviewedAt" = $1, "updatedAt" = $1
        WHERE "id" = $2
        "#,
    )
    .bind(reviewed_at)
    .bind(record_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Explicit manual star: the only path that may produce level 101.
pub async fn set_starred(
    pool: &PgPool,
    user_id: &str,
    item_id: &str,
) -> Result<bool, sqlx::Error> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE "item_memory"
        SET "memoryLevel" = $1,
            "lastMemoryUpdateAt" = $2,
            "version" = "version" + 1,
            "updatedAt" = $2
        WHERE "userId" = $3 AND "itemId" = $4
        "#,
    )
    .bind(STARRED_LEVEL)
    .bind(now)
    .bind(user_id)
    .bind(item_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn set_archived(
    pool: &PgPool,
    user_id: &str,
    item_id: &str,
    archived: bool,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE "item_memory"
        SET "isArchived" = $1, "updatedAt" = NOW()
        WHERE "userId" = $2 AND "itemId" = $3
        "#,
    )
    .bind(archived)
    .bind(user_id)
    .bind(item_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecayPage {
    pub decayed: i64,
    pub floored: i64,
}

/// Ids of the next page of records eligible for decay on `decay_date`,
/// ordered by id so callers can keyset-paginate past a failing page instead
/// of re-selecting it forever.
pub async fn select_decay_page(
    pool: &PgPool,
    decay_date: NaiveDate,
    after_id: Option<&str>,
    page_size: i64,
) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id" FROM "item_memory"
        WHERE "isArchived" = FALSE
          AND "memoryLevel" < 100
          AND ("lastDecayedOn" IS NULL OR "lastDecayedOn" <> $1)
          AND "id" > $2
        ORDER BY "id"
        LIMIT $3
        "#,
    )
    .bind(decay_date)
    .bind(after_id.unwrap_or(""))
    .bind(page_size)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.try_get("id").ok())
        .collect())
}

/// Applies one day's decay to the given records in a single statement.
///
/// The `lastDecayedOn` guard is re-checked here, so a rerun for the same
/// date (or a shard racing over the same page) is a no-op per record, and
/// the version bump makes a racing review write compose through the
/// optimistic guard instead of being clobbered.
pub async fn decay_records(
    pool: &PgPool,
    decay_date: NaiveDate,
    daily_decay_rate: i32,
    ids: &[String],
) -> Result<DecayPage, sqlx::Error> {
    if ids.is_empty() {
        return Ok(DecayPage::default());
    }

    let rows = sqlx::query(
        r#"
        UPDATE "item_memory"
        SET "memoryLevel" = GREATEST(0, "memoryLevel" + $1),
            "lastDecayedOn" = $2,
            "version" = "version" + 1,
            "updatedAt" = NOW()
        WHERE "id" = ANY($3)
          AND "isArchived" = FALSE
          AND "memoryLevel" < 100
          AND ("lastDecayedOn" IS NULL OR "lastDecayedOn" <> $2)
        RETURNING "memoryLevel"
        "#,
    )
    .bind(daily_decay_rate)
    .bind(decay_date)
    .bind(ids)
    .fetch_all(pool)
    .await?;

    let mut page = DecayPage {
        decayed: rows.len() as i64,
        floored: 0,
    };
    for row in &rows {
        if row.try_get::<i32, _>("memoryLevel").unwrap_or(0) == 0 {
            page.floored += 1;
        }
    }
    Ok(page)
}

/// Feed candidates: non-archived records below natural mastery, joined with
/// the item for text and length.
#[derive(Debug, Clone)]
pub struct FeedCandidate {
    pub item_id: String,
    pub text: String,
    pub length: i32,
    pub memory_level: i32,
}

pub async fn list_feed_candidates(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<FeedCandidate>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT m."itemId", i."text", i."length", m."memoryLevel"
        FROM "item_memory" m
        JOIN "items" i ON i."id" = m."itemId"
        WHERE m."userId" = $1
          AND m."isArchived" = FALSE
          AND m."memoryLevel" < 100
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| FeedCandidate {
            item_id: row.try_get("itemId").unwrap_or_default(),
            text: row.try_get("text").unwrap_or_default(),
            length: row.try_get("length").unwrap_or(0),
            memory_level: row.try_get("memoryLevel").unwrap_or(0),
        })
        .collect())
}

fn map_record_row(row: &sqlx::postgres::PgRow) -> ItemMemoryRecord {
    ItemMemoryRecord {
        id: row.try_get("id").unwrap_or_default(),
        user_id: row.try_get("userId").unwrap_or_default(),
        item_id: row.try_get("itemId").unwrap_or_default(),
        memory_level: row.try_get("memoryLevel").unwrap_or(0),
        is_quick_learner: row.try_get("isQuickLearner").unwrap_or(false),
        is_archived: row.try_get("isArchived").unwrap_or(false),
        last_reviewed_at: row.try_get("lastReviewedAt").ok(),
        last_memory_update_at: row.try_get("lastMemoryUpdateAt").ok(),
        last_decayed_on: row.try_get("lastDecayedOn").ok(),
        version: row.try_get("version").unwrap_or(0),
    }
}
