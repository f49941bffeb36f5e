//! Common type definitions.
//!
//! Entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: Admin/staff user identifier
//! - [`VillaId`]: Villa identifier
//! - [`BookingId`]: Booking identifier
//! - [`PaymentAttemptId`]: Payment attempt identifier
//! - [`SyncLogId`]: Channel sync log entry identifier
//!
//! Payment attempts are correlated with the bank by their order id
//! (`oid`), a 20-character hex string, not by [`PaymentAttemptId`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type VillaId = Uuid;
pub type BookingId = Uuid;
pub type PaymentAttemptId = Uuid;
pub type SyncLogId = Uuid;

/// Interpret a calendar date as midnight UTC.
///
/// Stay ranges are stored as timestamps; the wire format uses plain dates.
pub fn date_at_utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
