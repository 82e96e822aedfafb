use sqlx::PgPool;
use tracing::info;

/// Bootstrap DDL for the engine's tables. Statements are idempotent so the
/// daemon can run them unconditionally at startup.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "items" (
        "id" TEXT PRIMARY KEY,
        "text" TEXT NOT NULL,
        "length" INT NOT NULL,
        "difficulty" TEXT NOT NULL,
        "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "item_memory" (
        "id" TEXT PRIMARY KEY,
        "userId" TEXT NOT NULL,
        "itemId" TEXT NOT NULL,
        "memoryLevel" INT NOT NULL DEFAULT 0,
        "isQuickLearner" BOOLEAN NOT NULL DEFAULT FALSE,
        "isArchived" BOOLEAN NOT NULL DEFAULT FALSE,
        "lastReviewedAt" TIMESTAMPTZ,
        "lastMemoryUpdateAt" TIMESTAMPTZ,
        "lastDecayedOn" DATE,
        "version" BIGINT NOT NULL DEFAULT 0,
        "createdAt" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        "updatedAt" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE ("userId", "itemId")
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS "item_memory_decay_idx"
        ON "item_memory" ("isArchived", "memoryLevel")
        WHERE "isArchived" = FALSE AND "memoryLevel" < 100
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "review_events" (
        "id" TEXT PRIMARY KEY,
        "userId" TEXT NOT NULL,
        "itemId" TEXT NOT NULL,
        "action" TEXT NOT NULL,
        "increaseApplied" INT NOT NULL DEFAULT 0,
        "reviewedAt" TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS "review_events_window_idx"
        ON "review_events" ("userId", "itemId", "reviewedAt" DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "daily_stats" (
        "id" TEXT PRIMARY KEY,
        "userId" TEXT NOT NULL,
        "date" DATE NOT NULL,
        "wordsReviewed" INT NOT NULL DEFAULT 0,
        "dailyGoalAchieved" BOOLEAN NOT NULL DEFAULT FALSE,
        "updatedAt" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE ("userId", "date")
    )
    "#,
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(statements = STATEMENTS.len(), "schema bootstrap complete");
    Ok(())
}
