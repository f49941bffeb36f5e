//! Database models for channel sync logs.

use crate::types::SyncLogId;
use chrono::{DateTime, Utc};

/// Database request for appending a sync log entry
#[derive(Debug, Clone)]
pub struct SyncLogCreateDBRequest {
    pub villa_slug: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub available: bool,
    pub source: String,
}

/// Database response for a sync log entry
#[derive(Debug, Clone)]
pub struct SyncLogDBResponse {
    pub id: SyncLogId,
    pub villa_slug: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub available: bool,
    pub source: String,
    pub synced_at: DateTime<Utc>,
}
