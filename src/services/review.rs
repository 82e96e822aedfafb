use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::db::operations::memory::{
    ensure_record, get_record, set_archived, set_starred, touch_reviewed, update_memory_guarded,
    ItemMemoryRecord,
};
use crate::db::operations::reviews::{insert_event, recent_window};
use crate::db::operations::stats::record_review;
use crate::db::DatabaseProxy;
use crate::engine::memory_update::apply_known_review;
use crate::engine::types::{
    IncreaseBreakdown, ReviewAction, WindowEvent, BONUS_WINDOW_HOURS, STARRED_LEVEL,
};

/// Retries for the version-guarded write before giving up. Each retry
/// re-reads the record and re-runs the engine on fresh state.
const MAX_WRITE_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct ReviewSettings {
    pub quick_learning_enabled: bool,
    pub daily_goal: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("item not reviewable: {0}")]
    NotReviewable(String),
    #[error("concurrent write conflict after {MAX_WRITE_RETRIES} retries for record {0}")]
    Conflict(String),
    #[error("malformed review history: {0}")]
    Validation(String),
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub record: ItemMemoryRecord,
    /// Present only for `markedKnown` reviews.
    pub breakdown: Option<IncreaseBreakdown>,
}

/// Handles one review action: fetches current state and the 48h window,
/// runs the engine, and persists the result behind the optimistic guard.
pub async fn submit_review(
    proxy: &DatabaseProxy,
    user_id: &str,
    item_id: &str,
    action: ReviewAction,
    settings: ReviewSettings,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, ReviewError> {
    let pool = proxy.pool();
    let record = ensure_record(pool, user_id, item_id).await?;
    ensure_reviewable(&record)?;

    match action {
        ReviewAction::MarkedForReview => {
            // Timestamp touch, event, and daily stat land together or not
            // at all.
            let mut tx = pool.begin().await?;
            touch_reviewed(&mut *tx, &record.id, now).await?;
            insert_event(&mut *tx, user_id, item_id, action, 0, now).await?;
            record_review(&mut *tx, user_id, now.date_naive(), settings.daily_goal).await?;
            tx.commit().await?;

            let record = get_record(pool, user_id, item_id)
                .await?
                .ok_or_else(|| ReviewError::NotFound(item_id.to_string()))?;
            Ok(ReviewOutcome {
                record,
                breakdown: None,
            })
        }
        ReviewAction::MarkedKnown => {
            submit_known_review(proxy, user_id, item_id, record, settings, now).await
        }
    }
}

async fn submit_known_review(
    proxy: &DatabaseProxy,
    user_id: &str,
    item_id: &str,
    record: ItemMemoryRecord,
    settings: ReviewSettings,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, ReviewError> {
    let pool = proxy.pool();
    let window_start = now - Duration::hours(BONUS_WINDOW_HOURS);
    let mut current = record;

    for attempt in 0..MAX_WRITE_RETRIES {
        let window = recent_window(pool, user_id, item_id, window_start).await?;
        validate_window(&window, now)?;

        let increase = apply_known_review(
            current.memory_level,
            &window,
            current.is_quick_learner,
            settings.quick_learning_enabled,
            now,
        );

        // The guarded level write, the review event, and the daily stat
        // commit as one unit: a failure in any of them rolls back all
        // three, never leaving a raised level with no event behind it.
        let mut tx = pool.begin().await?;
        let written = update_memory_guarded(
            &mut *tx,
            &current.id,
            current.version,
            increase.new_level,
            increase.quick_learner,
            now,
        )
        .await?;

        if written {
            // The applied delta can be smaller than the breakdown total when
            // the 100 clamp kicked in; the event logs what actually landed.
            let applied = increase.new_level - current.memory_level;
            insert_event(
                &mut *tx,
                user_id,
                item_id,
                ReviewAction::MarkedKnown,
                applied,
                now,
            )
            .await?;
            record_review(&mut *tx, user_id, now.date_naive(), settings.daily_goal).await?;
            tx.commit().await?;

            debug!(
                user_id,
                item_id,
                from = current.memory_level,
                to = increase.new_level,
                tag = increase.breakdown.tag.label(),
                quick_learner = increase.quick_learner,
                breakdown = %serde_json::to_string(&increase.breakdown).unwrap_or_default(),
                "memory level updated"
            );

            let record = get_record(pool, user_id, item_id)
                .await?
                .ok_or_else(|| ReviewError::NotFound(item_id.to_string()))?;
            return Ok(ReviewOutcome {
                record,
                breakdown: Some(increase.breakdown),
            });
        }

        tx.rollback().await?;
        warn!(
            user_id,
            item_id,
            attempt = attempt + 1,
            "version conflict on memory update, retrying with fresh state"
        );
        current = get_record(pool, user_id, item_id)
            .await?
            .ok_or_else(|| ReviewError::NotFound(item_id.to_string()))?;
        ensure_reviewable(&current)?;
    }

    Err(ReviewError::Conflict(current.id))
}

fn ensure_reviewable(record: &ItemMemoryRecord) -> Result<(), ReviewError> {
    if record.is_archived {
        return Err(ReviewError::NotReviewable(format!(
            "item {} is archived",
            record.item_id
        )));
    }
    if record.memory_level >= STARRED_LEVEL {
        return Err(ReviewError::NotReviewable(format!(
            "item {} is starred",
            record.item_id
        )));
    }
    Ok(())
}

fn validate_window(window: &[WindowEvent], now: DateTime<Utc>) -> Result<(), ReviewError> {
    if window.iter().any(|event| event.reviewed_at > now) {
        return Err(ReviewError::Validation(
            "review window contains future-dated events".to_string(),
        ));
    }
    Ok(())
}

/// Manual star: sets the exempt sentinel level. Outside the engine's own
/// transitions, but the only sanctioned path to 101.
pub async fn star_item(
    proxy: &DatabaseProxy,
    user_id: &str,
    item_id: &str,
) -> Result<(), ReviewError> {
    if set_starred(proxy.pool(), user_id, item_id).await? {
        Ok(())
    } else {
        Err(ReviewError::NotFound(item_id.to_string()))
    }
}

pub async fn archive_item(
    proxy: &DatabaseProxy,
    user_id: &str,
    item_id: &str,
) -> Result<(), ReviewError> {
    if set_archived(proxy.pool(), user_id, item_id, true).await? {
        Ok(())
    } else {
        Err(ReviewError::NotFound(item_id.to_string()))
    }
}

pub async fn unarchive_item(
    proxy: &DatabaseProxy,
    user_id: &str,
    item_id: &str,
) -> Result<(), ReviewError> {
    if set_archived(proxy.pool(), user_id, item_id, false).await? {
        Ok(())
    } else {
        Err(ReviewError::NotFound(item_id.to_string()))
    }
}
