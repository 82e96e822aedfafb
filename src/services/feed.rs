use serde::Serialize;

use crate::db::operations::memory::list_feed_candidates;
use crate::db::DatabaseProxy;
use crate::engine::classify::{classify, MemoryBucket};
use crate::engine::priority::{compare_feed_entries, priority};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub item_id: String,
    pub text: String,
    pub memory_level: i32,
    pub bucket: MemoryBucket,
    pub priority: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub total: usize,
    pub offset: usize,
}

/// Review feed for one user: bucket-filtered, ordered by priority with the
/// item-id tie-break so page boundaries are stable across fetches.
pub async fn build_feed(
    proxy: &DatabaseProxy,
    user_id: &str,
    bucket: Option<MemoryBucket>,
    limit: usize,
    offset: usize,
) -> Result<FeedPage, sqlx::Error> {
    let candidates = list_feed_candidates(proxy.pool(), user_id).await?;

    let mut entries: Vec<FeedEntry> = candidates
        .into_iter()
        .map(|candidate| FeedEntry {
            bucket: classify(candidate.memory_level),
            priority: priority(candidate.memory_level, candidate.length.max(0) as usize),
            item_id: candidate.item_id,
            text: candidate.text,
            memory_level: candidate.memory_level,
        })
        .filter(|entry| bucket.map_or(true, |wanted| entry.bucket == wanted))
        .collect();

    entries.sort_by(|a, b| compare_feed_entries(a.priority, &a.item_id, b.priority, &b.item_id));

    let total = entries.len();
    let entries = entries.into_iter().skip(offset).take(limit).collect();

    Ok(FeedPage {
        entries,
        total,
        offset,
    })
}
