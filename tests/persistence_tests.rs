//! Postgres-backed persistence tests.
//!
//! These exercise the SQL contracts the pure engine tests cannot: the
//! per-day decay guard and the all-or-nothing review write. They need a
//! reachable database; when `DATABASE_URL` is unset each test returns
//! early so the suite stays green in environments without one.

use chrono::Utc;
use uuid::Uuid;

use wordmaster_engine::db::operations::memory::{
    decay_records, ensure_record, get_record, select_decay_page, update_memory_guarded,
};
use wordmaster_engine::db::operations::reviews::{insert_event, recent_window};
use wordmaster_engine::db::operations::stats::stats_since;
use wordmaster_engine::db::{schema, DatabaseProxy};
use wordmaster_engine::engine::types::ReviewAction;
use wordmaster_engine::services::review::{submit_review, ReviewSettings};

async fn test_proxy() -> Option<DatabaseProxy> {
    if std::env::var("DATABASE_URL").map_or(true, |url| url.is_empty()) {
        return None;
    }
    let proxy = DatabaseProxy::from_env().await.ok()?;
    schema::ensure_schema(proxy.pool()).await.ok()?;
    Some(proxy)
}

fn fresh_ids() -> (String, String) {
    (
        format!("test-user-{}", Uuid::new_v4()),
        format!("test-item-{}", Uuid::new_v4()),
    )
}

#[tokio::test]
async fn decay_rerun_for_same_date_is_a_noop() {
    let Some(proxy) = test_proxy().await else {
        return;
    };
    let pool = proxy.pool();
    let (user_id, item_id) = fresh_ids();

    let record = ensure_record(pool, &user_id, &item_id).await.unwrap();
    update_memory_guarded(pool, &record.id, record.version, 50, false, Utc::now())
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    let ids = vec![record.id.clone()];

    let first = decay_records(pool, today, -1, &ids).await.unwrap();
    assert_eq!(first.decayed, 1);

    // Same date again: the lastDecayedOn marker blocks a double decay.
    let second = decay_records(pool, today, -1, &ids).await.unwrap();
    assert_eq!(second.decayed, 0);

    let after = get_record(pool, &user_id, &item_id).await.unwrap().unwrap();
    assert_eq!(after.memory_level, 49);
    assert_eq!(after.last_decayed_on, Some(today));

    // And selection no longer offers the record for this date.
    let page = select_decay_page(pool, today, None, 1000).await.unwrap();
    assert!(!page.contains(&record.id));
}

#[tokio::test]
async fn known_review_lands_level_event_and_stat_together() {
    let Some(proxy) = test_proxy().await else {
        return;
    };
    let pool = proxy.pool();
    let (user_id, item_id) = fresh_ids();
    let now = Utc::now();
    let settings = ReviewSettings {
        quick_learning_enabled: true,
        daily_goal: 20,
    };

    let outcome = submit_review(
        &proxy,
        &user_id,
        &item_id,
        ReviewAction::MarkedKnown,
        settings,
        now,
    )
    .await
    .unwrap();
    assert_eq!(outcome.record.memory_level, 10);

    let window = recent_window(pool, &user_id, &item_id, now - chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].action, ReviewAction::MarkedKnown);

    let stats = stats_since(pool, &user_id, now.date_naive())
        .await
        .unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].words_reviewed, 1);
}

#[tokio::test]
async fn conflicted_write_rolls_back_its_companions() {
    let Some(proxy) = test_proxy().await else {
        return;
    };
    let pool = proxy.pool();
    let (user_id, item_id) = fresh_ids();
    let now = Utc::now();

    let record = ensure_record(pool, &user_id, &item_id).await.unwrap();

    // A stale version loses the guard; the event inserted alongside it in
    // the same transaction must vanish with the rollback, leaving no
    // orphaned history to inflate later bonus detection.
    let mut tx = pool.begin().await.unwrap();
    let written = update_memory_guarded(&mut *tx, &record.id, record.version + 1, 10, false, now)
        .await
        .unwrap();
    assert!(!written);
    insert_event(&mut *tx, &user_id, &item_id, ReviewAction::MarkedKnown, 10, now)
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    let window = recent_window(pool, &user_id, &item_id, now - chrono::Duration::hours(1))
        .await
        .unwrap();
    assert!(window.is_empty());

    let after = get_record(pool, &user_id, &item_id).await.unwrap().unwrap();
    assert_eq!(after.memory_level, 0);
}
