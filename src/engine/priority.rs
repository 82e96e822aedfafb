use std::cmp::Ordering;

/// Feed ranking score: higher means more urgent to review.
///
/// Total over [0, 101]: starred records (101) score 0, though feed queries
/// exclude them before scoring.
pub fn priority(memory_level: i32, item_length: usize) -> f64 {
    let remaining = (100 - memory_level).max(0) as f64;
    remaining * urgency_multiplier(memory_level) * length_factor(item_length)
}

/// Level exactly 20 takes the 1.5 branch; only strictly-below-20 is 3.0.
fn urgency_multiplier(memory_level: i32) -> f64 {
    if memory_level < 20 {
        3.0
    } else if memory_level <= 50 {
        1.5
    } else if memory_level <= 80 {
        1.0
    } else {
        0.3
    }
}

fn length_factor(item_length: usize) -> f64 {
    if item_length <= 4 {
        0.8
    } else if item_length <= 7 {
        1.0
    } else if item_length <= 10 {
        1.2
    } else {
        1.5
    }
}

/// Total ordering for feed entries: descending score, then ascending item id
/// so equal scores keep a stable order across page fetches.
pub fn compare_feed_entries(
    score_a: f64,
    item_id_a: &str,
    score_b: f64,
    item_id_b: &str,
) -> Ordering {
    score_b
        .total_cmp(&score_a)
        .then_with(|| item_id_a.cmp(item_id_b))
}
