use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};

use crate::db::operations::memory::{decay_records, select_decay_page, DecayPage};
use crate::db::DatabaseProxy;

const PAGE_SIZE: i64 = 500;
const MAX_CONSECUTIVE_SELECT_FAILURES: u32 = 3;

#[derive(Debug, Default)]
struct DecayStats {
    pages: i64,
    records_decayed: i64,
    floors_hit: i64,
    failed_pages: i64,
    duration_secs: f64,
}

/// Folds one page's outcome into the run totals. A failed page is counted
/// and logged, never propagated: the cursor has already moved past it, so
/// the rest of the population still decays and the page's records are
/// picked up by the next run via their unset `lastDecayedOn`.
fn record_page_result(stats: &mut DecayStats, result: Result<DecayPage, sqlx::Error>) {
    match result {
        Ok(page) => {
            stats.pages += 1;
            stats.records_decayed += page.decayed;
            stats.floors_hit += page.floored;
        }
        Err(e) => {
            stats.failed_pages += 1;
            error!(error = %e, "Decay page failed, its records retry next run");
        }
    }
}

/// Daily decay batch: pages through eligible records for today's UTC date.
///
/// Selection keyset-paginates on record id, so the cursor advances whether
/// or not a page's update succeeds and a poisoned page cannot stall the
/// batch. Each update re-checks `lastDecayedOn`, which makes the run
/// idempotent per day and restartable. Only repeated selection failures
/// (the database itself unreachable) abort the run.
pub async fn run_daily_decay(
    db: Arc<DatabaseProxy>,
    daily_decay_rate: i32,
) -> Result<(), super::WorkerError> {
    let start = Instant::now();
    let today = Utc::now().date_naive();
    info!(date = %today, rate = daily_decay_rate, "Starting memory decay batch");

    let pool = db.pool();
    let mut stats = DecayStats::default();
    let mut cursor: Option<String> = None;
    let mut consecutive_select_failures: u32 = 0;

    loop {
        let ids = match select_decay_page(pool, today, cursor.as_deref(), PAGE_SIZE).await {
            Ok(ids) => {
                consecutive_select_failures = 0;
                ids
            }
            Err(e) => {
                consecutive_select_failures += 1;
                error!(
                    error = %e,
                    attempt = consecutive_select_failures,
                    "Decay page selection failed"
                );
                if consecutive_select_failures >= MAX_CONSECUTIVE_SELECT_FAILURES {
                    return Err(e.into());
                }
                continue;
            }
        };
        if ids.is_empty() {
            break;
        }
        cursor = ids.last().cloned();

        let result = decay_records(pool, today, daily_decay_rate, &ids).await;
        record_page_result(&mut stats, result);
    }

    stats.duration_secs = start.elapsed().as_secs_f64();

    info!(
        date = %today,
        pages = stats.pages,
        records_decayed = stats.records_decayed,
        floors_hit = stats.floors_hit,
        failed_pages = stats.failed_pages,
        duration_secs = format!("{:.2}", stats.duration_secs),
        "Memory decay batch completed"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_pages_accumulate() {
        let mut stats = DecayStats::default();
        record_page_result(
            &mut stats,
            Ok(DecayPage {
                decayed: 500,
                floored: 12,
            }),
        );
        record_page_result(
            &mut stats,
            Ok(DecayPage {
                decayed: 41,
                floored: 0,
            }),
        );
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.records_decayed, 541);
        assert_eq!(stats.floors_hit, 12);
        assert_eq!(stats.failed_pages, 0);
    }

    #[test]
    fn test_failed_page_is_counted_and_run_continues() {
        let mut stats = DecayStats::default();
        record_page_result(
            &mut stats,
            Ok(DecayPage {
                decayed: 500,
                floored: 3,
            }),
        );
        // Failure in the middle of the run must not undo or block the
        // pages around it.
        record_page_result(&mut stats, Err(sqlx::Error::RowNotFound));
        record_page_result(
            &mut stats,
            Ok(DecayPage {
                decayed: 200,
                floored: 1,
            }),
        );
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.failed_pages, 1);
        assert_eq!(stats.records_decayed, 700);
        assert_eq!(stats.floors_hit, 4);
    }
}
