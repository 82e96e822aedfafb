use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Highest level reachable through reviews. 101 is reserved for the manual
/// star action and never produced by the engine.
pub const MAX_NATURAL_LEVEL: i32 = 100;
pub const STARRED_LEVEL: i32 = 101;

pub const BASE_INCREASE: i32 = 10;
pub const QUICK_LEARNER_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_DAILY_DECAY_RATE: i32 = -1;

/// Sliding window consulted for bonus detection, in hours.
pub const BONUS_WINDOW_HOURS: i64 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewAction {
    MarkedKnown,
    MarkedForReview,
}

impl ReviewAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MarkedKnown => "MARKED_KNOWN",
            Self::MarkedForReview => "MARKED_FOR_REVIEW",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MARKED_KNOWN" => Some(Self::MarkedKnown),
            "MARKED_FOR_REVIEW" => Some(Self::MarkedForReview),
            _ => None,
        }
    }
}

/// One entry of the recent-review window, ordered newest-first by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    pub action: ReviewAction,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncreaseTag {
    Standard,
    TwoWithin24h,
    ThreeWithin48h,
    FourPlusConsistent,
}

impl IncreaseTag {
    pub fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard review",
            Self::TwoWithin24h => "2x within 24h",
            Self::ThreeWithin48h => "3x within 48h",
            Self::FourPlusConsistent => "4+ consistent",
        }
    }
}

/// Why a level changed, reported alongside the new level so callers can log
/// or surface the reason without re-running detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseBreakdown {
    pub base: i32,
    pub bonus: i32,
    pub multiplier: f64,
    pub tag: IncreaseTag,
    /// round((base + bonus) * multiplier), before clamping at 100.
    pub total: i32,
}

/// Output of `apply_known_review`. The quick-learner flag is an explicit
/// state-transition output, never a hidden mutation: callers persist it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewIncrease {
    pub new_level: i32,
    pub breakdown: IncreaseBreakdown,
    pub quick_learner: bool,
}

/// Difficulty tag derived once from item length at creation; breakpoints
/// match the priority length factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemDifficulty {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl ItemDifficulty {
    pub fn from_length(length: usize) -> Self {
        if length <= 4 {
            Self::Short
        } else if length <= 7 {
            Self::Medium
        } else if length <= 10 {
            Self::Long
        } else {
            Self::VeryLong
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
            Self::VeryLong => "veryLong",
        }
    }
}

/// Per-user per-day aggregate, read-only input to the streak estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub words_reviewed: i64,
    pub daily_goal_achieved: bool,
}

pub fn clamp_natural(level: i32) -> i32 {
    level.clamp(0, MAX_NATURAL_LEVEL)
}
