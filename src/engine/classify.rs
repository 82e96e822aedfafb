use serde::{Deserialize, Serialize};

/// Review buckets derived from the memory level. These thresholds are the
/// single source of truth for both feed filtering and display; no other
/// component may redefine them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoryBucket {
    Critical,
    Learning,
    Reviewing,
    WellKnown,
    Mastered,
}

impl MemoryBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Learning => "learning",
            Self::Reviewing => "reviewing",
            Self::WellKnown => "wellKnown",
            Self::Mastered => "mastered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "critical" => Some(Self::Critical),
            "learning" => Some(Self::Learning),
            "reviewing" => Some(Self::Reviewing),
            "wellKnown" => Some(Self::WellKnown),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

pub fn classify(memory_level: i32) -> MemoryBucket {
    match memory_level {
        level if level < 21 => MemoryBucket::Critical,
        level if level <= 50 => MemoryBucket::Learning,
        level if level <= 80 => MemoryBucket::Reviewing,
        level if level < 100 => MemoryBucket::WellKnown,
        _ => MemoryBucket::Mastered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(classify(0), MemoryBucket::Critical);
        assert_eq!(classify(20), MemoryBucket::Critical);
        assert_eq!(classify(21), MemoryBucket::Learning);
        assert_eq!(classify(50), MemoryBucket::Learning);
        assert_eq!(classify(51), MemoryBucket::Reviewing);
        assert_eq!(classify(80), MemoryBucket::Reviewing);
        assert_eq!(classify(81), MemoryBucket::WellKnown);
        assert_eq!(classify(99), MemoryBucket::WellKnown);
        assert_eq!(classify(100), MemoryBucket::Mastered);
        assert_eq!(classify(101), MemoryBucket::Mastered);
    }

    #[test]
    fn test_parse_round_trip() {
        for bucket in [
            MemoryBucket::Critical,
            MemoryBucket::Learning,
            MemoryBucket::Reviewing,
            MemoryBucket::WellKnown,
            MemoryBucket::Mastered,
        ] {
            assert_eq!(MemoryBucket::parse(bucket.as_str()), Some(bucket));
        }
        assert_eq!(MemoryBucket::parse("archived"), None);
    }
}
