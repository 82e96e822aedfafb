use chrono::{DateTime, Duration, Utc};

use crate::engine::types::{
    clamp_natural, IncreaseBreakdown, IncreaseTag, ReviewAction, ReviewIncrease, WindowEvent,
    BASE_INCREASE, QUICK_LEARNER_MULTIPLIER,
};

/// Applies a `markedKnown` review to the current memory level.
///
/// `recent_reviews` is the 48h event window for this (user, item), ordered
/// newest-first and excluding the event being recorded. The level is the
/// durable running total; the window is consulted only for bonus detection.
///
/// Bonus tiers are mutually exclusive, first match wins:
/// - 2nd known mark within 24h of the earliest known event: +20
/// - 3rd known mark within 48h of the earliest known event: +30
/// - 4th or later mark with an all-known window (no interleaved
///   review-needed marks): +40
///
/// Any tier match marks the item quick-learner, and the flag is sticky. The
/// 1.5x multiplier applies from the triggering event onward, including the
/// event that earned the flag.
pub fn apply_known_review(
    current_level: i32,
    recent_reviews: &[WindowEvent],
    is_quick_learner: bool,
    quick_learning_enabled: bool,
    now: DateTime<Utc>,
) -> ReviewIncrease {
    if !quick_learning_enabled {
        return ReviewIncrease {
            new_level: clamp_natural(current_level + BASE_INCREASE),
            breakdown: IncreaseBreakdown {
                base: BASE_INCREASE,
                bonus: 0,
                multiplier: 1.0,
                tag: IncreaseTag::Standard,
                total: BASE_INCREASE,
            },
            quick_learner: is_quick_learner,
        };
    }

    let (bonus, tag) = detect_bonus(recent_reviews, now);
    let quick_learner = is_quick_learner || bonus > 0;
    let multiplier = if quick_learner {
        QUICK_LEARNER_MULTIPLIER
    } else {
        1.0
    };
    let total = ((BASE_INCREASE + bonus) as f64 * multiplier).round() as i32;

    ReviewIncrease {
        new_level: clamp_natural(current_level + total),
        breakdown: IncreaseBreakdown {
            base: BASE_INCREASE,
            bonus,
            multiplier,
            tag,
            total,
        },
        quick_learner,
    }
}

fn detect_bonus(recent_reviews: &[WindowEvent], now: DateTime<Utc>) -> (i32, IncreaseTag) {
    let known: Vec<&WindowEvent> = recent_reviews
        .iter()
        .filter(|event| event.action == ReviewAction::MarkedKnown)
        .collect();
    let known_count = known.len();

    // Newest-first ordering: the earliest known event is the last entry.
    let earliest_known_at = known.last().map(|event| event.reviewed_at);

    match (known_count, earliest_known_at) {
        (1, Some(earliest)) if now - earliest < Duration::hours(24) => {
            (20, IncreaseTag::TwoWithin24h)
        }
        (2, Some(earliest)) if now - earliest < Duration::hours(48) => {
            (30, IncreaseTag::ThreeWithin48h)
        }
        (count, Some(_))
            if count >= 3
                && recent_reviews
                    .iter()
                    .all(|event| event.action == ReviewAction::MarkedKnown) =>
        {
            (40, IncreaseTag::FourPlusConsistent)
        }
        _ => (0, IncreaseTag::Standard),
    }
}
