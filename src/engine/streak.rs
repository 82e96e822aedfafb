use chrono::{Duration, NaiveDate};

use crate::engine::types::{DailyStat, MAX_NATURAL_LEVEL};

/// Consecutive days ending at `today` whose daily goal was achieved.
///
/// Walks backwards from `today`; the first missing day or unmet goal stops
/// the count. `today` is a parameter so callers anchor the walk explicitly.
pub fn current_streak(daily_stats: &[DailyStat], today: NaiveDate) -> i64 {
    let mut sorted: Vec<&DailyStat> = daily_stats.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut expected = today;
    let mut streak = 0;
    for stat in sorted {
        if stat.date > expected {
            // Future-dated rows are ignored rather than breaking the walk.
            continue;
        }
        if stat.date != expected || !stat.daily_goal_achieved {
            break;
        }
        streak += 1;
        expected = expected - Duration::days(1);
    }
    streak
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryProjection {
    /// Level is already at or past 100.
    AlreadyMastered { date: NaiveDate },
    /// Net daily progress is positive; mastery lands on `date`.
    Achievable { days: i64, date: NaiveDate },
    /// Gains do not outpace decay; the level reaches 0 after this many days.
    NotAchievable { days_until_forgotten: i64 },
}

/// Projects days-to-mastery from the recent average daily gain and the
/// configured decay rate (negative).
pub fn estimate_time_to_mastery(
    current_level: i32,
    avg_daily_gain: f64,
    daily_decay_rate: i32,
    today: NaiveDate,
) -> MasteryProjection {
    if current_level >= MAX_NATURAL_LEVEL {
        return MasteryProjection::AlreadyMastered { date: today };
    }

    let net_daily = avg_daily_gain + daily_decay_rate as f64;
    if net_daily <= 0.0 {
        let per_day = i64::from(daily_decay_rate.unsigned_abs()).max(1);
        return MasteryProjection::NotAchievable {
            days_until_forgotten: i64::from(current_level.max(0)) / per_day,
        };
    }

    let days = ((MAX_NATURAL_LEVEL - current_level) as f64 / net_daily).ceil() as i64;
    MasteryProjection::Achievable {
        days,
        date: today + Duration::days(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn stat(d: u32, achieved: bool) -> DailyStat {
        DailyStat {
            date: day(d),
            words_reviewed: 20,
            daily_goal_achieved: achieved,
        }
    }

    #[test]
    fn test_empty_stats_zero_streak() {
        assert_eq!(current_streak(&[], day(15)), 0);
    }

    #[test]
    fn test_five_consecutive_days_ending_today() {
        let stats: Vec<DailyStat> = (11..=15).map(|d| stat(d, true)).collect();
        assert_eq!(current_streak(&stats, day(15)), 5);
    }

    #[test]
    fn test_gap_truncates_streak() {
        // Day 13 missing: only 15 and 14 count.
        let stats = vec![stat(15, true), stat(14, true), stat(12, true), stat(11, true)];
        assert_eq!(current_streak(&stats, day(15)), 2);
    }

    #[test]
    fn test_unmet_goal_truncates_streak() {
        let stats = vec![stat(15, true), stat(14, false), stat(13, true)];
        assert_eq!(current_streak(&stats, day(15)), 1);
    }

    #[test]
    fn test_no_stat_for_today_is_zero() {
        let stats = vec![stat(13, true), stat(14, true)];
        assert_eq!(current_streak(&stats, day(15)), 0);
    }

    #[test]
    fn test_unsorted_input_is_handled() {
        let stats = vec![stat(13, true), stat(15, true), stat(14, true)];
        assert_eq!(current_streak(&stats, day(15)), 3);
    }

    #[test]
    fn test_already_mastered() {
        assert_eq!(
            estimate_time_to_mastery(100, 2.0, -1, day(15)),
            MasteryProjection::AlreadyMastered { date: day(15) }
        );
    }

    #[test]
    fn test_achievable_projection() {
        // net = 1/day, 10 points remaining.
        assert_eq!(
            estimate_time_to_mastery(90, 2.0, -1, day(15)),
            MasteryProjection::Achievable {
                days: 10,
                date: day(25)
            }
        );
    }

    #[test]
    fn test_not_achievable_reports_days_until_forgotten() {
        assert_eq!(
            estimate_time_to_mastery(50, 0.5, -1, day(15)),
            MasteryProjection::NotAchievable {
                days_until_forgotten: 50
            }
        );
    }

    #[test]
    fn test_fractional_net_rounds_up() {
        // net = 0.5/day, 10 points remaining -> 20 days.
        assert_eq!(
            estimate_time_to_mastery(90, 1.5, -1, day(15)),
            MasteryProjection::Achievable {
                days: 20,
                date: NaiveDate::from_ymd_opt(2024, 7, 5).unwrap()
            }
        );
    }
}
