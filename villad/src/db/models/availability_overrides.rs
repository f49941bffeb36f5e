//! Database models for per-day availability overrides.
//!
//! Overrides are written by channel synchronization: one row per blocked
//! calendar day, keyed on `(villa_slug, date)`.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Database response for an availability override
#[derive(Debug, Clone)]
pub struct AvailabilityOverrideDBResponse {
    pub id: Uuid,
    pub villa_slug: String,
    pub date: NaiveDate,
    pub available: bool,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate view of blocks inside a date range
#[derive(Debug, Clone)]
pub struct BlockedRangeDBResponse {
    pub blocked_dates: i64,
    /// Distinct sources in first-seen order
    pub sources: Vec<String>,
}
