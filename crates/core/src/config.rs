#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const DEFAULT_TRASH_LIMIT_DAYS: u32 = 30;
pub const DEFAULT_SWEEP_BATCH_LIMIT: usize = 100;

/// Key of the grace period in the store's `meta` table.
pub const TRASH_LIMIT_DAYS_KEY: &str = "knowledge.trash_limit_days";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days a trashed article survives after its last modification.
    pub trash_limit_days: u32,
    /// Upper bound of articles hard-deleted by one sweep run.
    pub sweep_batch_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trash_limit_days: DEFAULT_TRASH_LIMIT_DAYS,
            sweep_batch_limit: DEFAULT_SWEEP_BATCH_LIMIT,
        }
    }
}

impl EngineConfig {
    pub fn with_trash_limit_days(mut self, days: u32) -> Self {
        self.trash_limit_days = days;
        self
    }

    pub fn grace_period_ms(&self) -> i64 {
        i64::from(self.trash_limit_days) * DAY_MS
    }

    /// Articles trashed and last modified before this instant are expired.
    pub fn expiry_cutoff_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.grace_period_ms())
    }

    pub fn deletion_at_ms(&self, updated_at_ms: i64) -> i64 {
        updated_at_ms.saturating_add(self.grace_period_ms())
    }

    pub fn deletion_date(&self, updated_at_ms: i64) -> Option<OffsetDateTime> {
        timestamp_from_ms(self.deletion_at_ms(updated_at_ms))
    }
}

/// Stored grace period; anything missing or not a positive integer falls back
/// to the default.
pub fn parse_trash_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_TRASH_LIMIT_DAYS)
}

pub fn timestamp_from_ms(at_ms: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(at_ms) * 1_000_000).ok()
}

/// RFC 3339 rendering used in logs; falls back to epoch seconds.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.unix_timestamp().to_string())
}
