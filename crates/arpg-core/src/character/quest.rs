//! Fasting quest: a persisted start timestamp that drives the
//! time-based discipline model.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;
use crate::core::storage::KeyValueStore;

/// Storage key for the quest start timestamp.
pub const QUEST_START_KEY: &str = "fastingQuestStart";

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuestError {
    #[error("invalid quest timestamp {0:?}: expected ISO-8601 (e.g. 2024-01-31T18:30)")]
    InvalidTimestamp(String),
    #[error("quest timestamps before 1970 are not supported: {0:?}")]
    BeforeEpoch(String),
    #[error("fasting quests are disabled for this progression model")]
    Disabled,
}

/// Parse an ISO-8601 timestamp into Unix milliseconds.
///
/// Accepts RFC 3339 (`2024-01-31T18:30:00Z`, `...+02:00`) and the offset-less
/// `datetime-local` form (`2024-01-31T18:30`, optional seconds), read as UTC.
pub fn parse_timestamp(input: &str) -> Result<u64, QuestError> {
    let trimmed = input.trim();
    let ms = if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        dt.timestamp_millis()
    } else {
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(|naive| naive.and_utc().timestamp_millis())
            .ok_or_else(|| QuestError::InvalidTimestamp(input.to_string()))?
    };
    u64::try_from(ms).map_err(|_| QuestError::BeforeEpoch(input.to_string()))
}

/// Format Unix milliseconds as RFC 3339 UTC with millisecond precision.
pub fn format_timestamp(ms: u64) -> Option<String> {
    let ms = i64::try_from(ms).ok()?;
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Quest start persistence. Absence of the key means no active quest.
pub struct FastingQuest {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl FastingQuest {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(store, QUEST_START_KEY)
    }

    pub fn with_key(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Start (or restart) the quest at `ms`. Returns the stored timestamp.
    pub fn start_at_ms(&mut self, ms: u64) -> Option<String> {
        let stamp = format_timestamp(ms)?;
        self.store.set(&self.key, &stamp);
        log::info!("fasting quest started at {}", stamp);
        Some(stamp)
    }

    /// Start the quest from user input. Invalid input leaves any existing
    /// quest untouched.
    pub fn start_at(&mut self, input: &str) -> Result<u64, QuestError> {
        let ms = parse_timestamp(input)?;
        self.start_at_ms(ms)
            .ok_or_else(|| QuestError::InvalidTimestamp(input.to_string()))?;
        Ok(ms)
    }

    pub fn reset(&mut self) {
        self.store.remove(&self.key);
        log::info!("fasting quest reset");
    }

    /// Stored start time. A value that no longer parses counts as no quest.
    pub fn start_ms(&self) -> Option<u64> {
        let raw = self.store.get(&self.key)?;
        match parse_timestamp(&raw) {
            Ok(ms) => Some(ms),
            Err(err) => {
                log::warn!("ignoring stored quest start: {}", err);
                None
            }
        }
    }

    pub fn start_timestamp(&self) -> Option<String> {
        self.start_ms().and_then(format_timestamp)
    }

    pub fn is_active(&self) -> bool {
        self.start_ms().is_some()
    }

    /// Whole minutes since the quest started. None without a quest, and
    /// None while the recorded start is still in the future.
    pub fn elapsed_minutes(&self, now_ms: u64) -> Option<u64> {
        self.start_ms()
            .filter(|&start| now_ms >= start)
            .map(|start| (now_ms - start) / MS_PER_MINUTE)
    }
}
