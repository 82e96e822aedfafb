use std::str::FromStr;

use cron::Schedule;
use tracing::warn;

use crate::engine::types::DEFAULT_DAILY_DECAY_RATE;

const DEFAULT_DECAY_SCHEDULE: &str = "0 0 1 * * *";
const DEFAULT_CLEANUP_SCHEDULE: &str = "0 30 1 * * *";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub quick_learning_enabled: bool,
    /// Reviews per day that flip `dailyGoalAchieved`.
    pub daily_goal: i32,
    /// Negative; applied once per UTC day to each eligible record.
    pub daily_decay_rate: i32,
    pub decay_schedule: String,
    pub cleanup_schedule: String,
    pub event_retention_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let quick_learning_enabled = std::env::var("QUICK_LEARNING_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let daily_goal = std::env::var("DAILY_GOAL")
            .ok()
            .and_then(|value| value.parse::<i32>().ok())
            .filter(|goal| *goal > 0)
            .unwrap_or(20);

        let daily_decay_rate = std::env::var("DAILY_DECAY_RATE")
            .ok()
            .and_then(|value| value.parse::<i32>().ok())
            .filter(|rate| *rate < 0)
            .unwrap_or(DEFAULT_DAILY_DECAY_RATE);

        let decay_schedule = schedule_from_env("DECAY_SCHEDULE", DEFAULT_DECAY_SCHEDULE);
        let cleanup_schedule = schedule_from_env("EVENT_CLEANUP_SCHEDULE", DEFAULT_CLEANUP_SCHEDULE);

        let event_retention_days = std::env::var("EVENT_RETENTION_DAYS")
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|days| *days >= 7)
            .unwrap_or(30);

        Self {
            log_level,
            quick_learning_enabled,
            daily_goal,
            daily_decay_rate,
            decay_schedule,
            cleanup_schedule,
            event_retention_days,
        }
    }
}

fn schedule_from_env(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if Schedule::from_str(&value).is_ok() => value,
        Ok(value) => {
            warn!(key, value = %value, default, "invalid cron expression, using default");
            default.to_string()
        }
        Err(_) => default.to_string(),
    }
}
