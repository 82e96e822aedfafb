use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::db::operations::reviews::delete_events_before;
use crate::db::DatabaseProxy;

/// Prunes review events past the retention window. The bonus window (48h)
/// and the gain window (7d) read far less history than any sane retention
/// setting, so pruning never affects engine output.
pub async fn prune_old_events(
    db: Arc<DatabaseProxy>,
    retention_days: i64,
) -> Result<(), super::WorkerError> {
    let start = Instant::now();
    debug!(retention_days, "Starting review event cleanup");

    let cutoff = Utc::now() - Duration::days(retention_days);
    let deleted = delete_events_before(db.pool(), cutoff).await?;

    info!(
        deleted,
        retention_days,
        duration_secs = format!("{:.2}", start.elapsed().as_secs_f64()),
        "Review event cleanup completed"
    );

    Ok(())
}
