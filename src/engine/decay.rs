use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayOutcome {
    pub new_level: i32,
    /// Magnitude of the configured decrement, reported for metrics even when
    /// the floor clamp absorbed part or all of it.
    pub amount_decayed: i32,
}

/// One day's passive decay for a single record. `daily_decay_rate` is
/// negative; the level never drops below 0.
pub fn decay_one(current_level: i32, daily_decay_rate: i32) -> DecayOutcome {
    DecayOutcome {
        new_level: (current_level + daily_decay_rate).max(0),
        amount_decayed: daily_decay_rate.abs(),
    }
}

/// Per-record eligibility for the daily batch on `today`.
///
/// This is the contract the batch SQL enforces in its WHERE clause: archived
/// records and levels at or past natural mastery (100 and the starred 101)
/// are exempt, and a record already marked for `today` is skipped, which is
/// what makes a same-day rerun a per-record no-op.
pub fn should_decay(
    last_decayed_on: Option<NaiveDate>,
    memory_level: i32,
    is_archived: bool,
    today: NaiveDate,
) -> bool {
    !is_archived && memory_level < 100 && last_decayed_on != Some(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_decrements_by_rate() {
        assert_eq!(decay_one(50, -1).new_level, 49);
        assert_eq!(decay_one(50, -3).new_level, 47);
    }

    #[test]
    fn test_floor_holds() {
        let outcome = decay_one(0, -1);
        assert_eq!(outcome.new_level, 0);
        assert_eq!(outcome.amount_decayed, 1);
    }

    #[test]
    fn test_clamped_partial_decay_still_reports_amount() {
        let outcome = decay_one(1, -3);
        assert_eq!(outcome.new_level, 0);
        assert_eq!(outcome.amount_decayed, 3);
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_unmarked_record_is_eligible() {
        assert!(should_decay(None, 50, false, day(15)));
        assert!(should_decay(Some(day(14)), 50, false, day(15)));
    }

    #[test]
    fn test_same_day_rerun_is_skipped() {
        assert!(!should_decay(Some(day(15)), 50, false, day(15)));
    }

    #[test]
    fn test_mastered_and_starred_are_exempt() {
        assert!(!should_decay(None, 100, false, day(15)));
        assert!(!should_decay(None, 101, false, day(15)));
        assert!(should_decay(None, 99, false, day(15)));
    }

    #[test]
    fn test_archived_is_exempt() {
        assert!(!should_decay(None, 50, true, day(15)));
    }

    #[test]
    fn test_rerun_after_marker_yields_same_level_as_single_run() {
        // First run: eligible, decay applies and the marker is set.
        let today = day(15);
        let mut level = 40;
        let mut marker = None;
        if should_decay(marker, level, false, today) {
            level = decay_one(level, -1).new_level;
            marker = Some(today);
        }
        assert_eq!(level, 39);

        // Second run for the same date: marker blocks a double decay.
        if should_decay(marker, level, false, today) {
            level = decay_one(level, -1).new_level;
        }
        assert_eq!(level, 39);

        // Next day decays again.
        let tomorrow = day(16);
        if should_decay(marker, level, false, tomorrow) {
            level = decay_one(level, -1).new_level;
        }
        assert_eq!(level, 38);
    }
}
