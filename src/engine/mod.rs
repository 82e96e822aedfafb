//! Pure retention algorithms. No I/O in this tree: callers fetch state,
//! pass clocks/dates explicitly, and persist the returned values.

pub mod classify;
pub mod decay;
pub mod memory_update;
pub mod priority;
pub mod streak;
pub mod types;

pub use classify::{classify, MemoryBucket};
pub use decay::{decay_one, should_decay, DecayOutcome};
pub use memory_update::apply_known_review;
pub use priority::{compare_feed_entries, priority};
pub use streak::{current_streak, estimate_time_to_mastery, MasteryProjection};
