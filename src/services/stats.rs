use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::db::operations::memory::get_record;
use crate::db::operations::reviews::sum_increase_since;
use crate::db::operations::stats::stats_since;
use crate::db::DatabaseProxy;
use crate::engine::streak::{current_streak, estimate_time_to_mastery, MasteryProjection};

/// Streaks longer than a year are still reported exactly; the lookback just
/// bounds the query.
const STREAK_LOOKBACK_DAYS: i64 = 366;

/// Trailing window used to derive the average daily gain for projections.
const GAIN_WINDOW_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

pub async fn get_current_streak(
    proxy: &DatabaseProxy,
    user_id: &str,
    today: NaiveDate,
) -> Result<i64, StatsError> {
    let since = today - Duration::days(STREAK_LOOKBACK_DAYS);
    let stats = stats_since(proxy.pool(), user_id, since).await?;
    Ok(current_streak(&stats, today))
}

/// Projects days-to-mastery (or days-until-forgotten) for one item from its
/// current level and the trailing 7-day average gain.
pub async fn project_mastery(
    proxy: &DatabaseProxy,
    user_id: &str,
    item_id: &str,
    daily_decay_rate: i32,
    now: DateTime<Utc>,
) -> Result<MasteryProjection, StatsError> {
    let pool = proxy.pool();
    let record = get_record(pool, user_id, item_id)
        .await?
        .ok_or_else(|| StatsError::NotFound(item_id.to_string()))?;

    let since = now - Duration::days(GAIN_WINDOW_DAYS);
    let gained = sum_increase_since(pool, user_id, item_id, since).await?;
    let avg_daily_gain = gained as f64 / GAIN_WINDOW_DAYS as f64;

    Ok(estimate_time_to_mastery(
        record.memory_level,
        avg_daily_gain,
        daily_decay_rate,
        now.date_naive(),
    ))
}
