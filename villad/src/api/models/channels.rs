//! API models for channel-manager synchronization.
//!
//! Inbound webhook payloads keep the snake_case field names external channel
//! managers send; everything else follows the camelCase convention of the
//! rest of the API.

use crate::api::models::bookings::BookingResponse;
use crate::db::models::sync_logs::SyncLogDBResponse;
use crate::types::SyncLogId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Push a date-range block or unblock out to connected channels.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSyncRequest {
    pub villa_slug: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelSyncResult {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelSyncResponse {
    pub ok: bool,
    pub message: String,
    pub result: ChannelSyncResult,
}

/// Reservation notification pushed by an external channel manager.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelBookingWebhook {
    /// Channel-side property identifier, mapped to a villa slug via config
    pub property_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub checkin_date: Option<NaiveDate>,
    pub checkout_date: Option<NaiveDate>,
    pub guest_count: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    /// Channel-side reservation reference
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelWebhookResponse {
    pub ok: bool,
    pub message: String,
    pub booking: BookingResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SyncLogId,
    pub villa_slug: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub available: bool,
    pub source: String,
    pub synced_at: DateTime<Utc>,
}

impl From<SyncLogDBResponse> for SyncLogResponse {
    fn from(db: SyncLogDBResponse) -> Self {
        Self {
            id: db.id,
            villa_slug: db.villa_slug,
            check_in: db.check_in,
            check_out: db.check_out,
            available: db.available,
            source: db.source,
            synced_at: db.synced_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogsQuery {
    pub limit: Option<i64>,
    pub villa_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncLogsResponse {
    pub ok: bool,
    pub logs: Vec<SyncLogResponse>,
    pub count: usize,
}

/// Availability verdict that also accounts for channel-synced blocks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAvailabilityResponse {
    pub ok: bool,
    pub available: bool,
    pub conflicting_bookings: i64,
    /// Calendar days inside the range blocked by a channel sync
    pub blocked_dates: i64,
    /// Distinct block sources, in first-seen order
    pub sources: Vec<String>,
}
