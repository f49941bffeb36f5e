//! API request/response models for bookings.

use crate::api::models::villas::VillaSummary;
use crate::db::models::bookings::{BookingDBResponse, BookingWithVillaDBResponse};
use crate::types::BookingId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Paid,
    Cancelled,
}

/// Public reservation submission.
///
/// Every field is optional at the serde layer so missing values produce the
/// endpoint's own 400 rather than a deserialization rejection; the handler
/// enforces presence.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreate {
    pub villa_slug: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Check-in date (interpreted as midnight UTC)
    pub from: Option<NaiveDate>,
    /// Check-out date (interpreted as midnight UTC)
    pub to: Option<NaiveDate>,
    pub guests: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
}

/// Admin booking edit; only supplied fields change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    pub villa_slug: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub status: Option<BookingStatus>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BookingId,
    pub villa_slug: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub status: BookingStatus,
    pub source: String,
    pub created_at: DateTime<Utc>,
    /// Embedded villa summary (admin listing only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub villa: Option<VillaSummary>,
}

impl From<BookingDBResponse> for BookingResponse {
    fn from(db: BookingDBResponse) -> Self {
        Self {
            id: db.id,
            villa_slug: db.villa_slug,
            name: db.name,
            email: db.email,
            phone: db.phone,
            check_in: db.check_in,
            check_out: db.check_out,
            guests: db.guests,
            amount: db.amount,
            status: db.status,
            source: db.source,
            created_at: db.created_at,
            villa: None,
        }
    }
}

impl From<BookingWithVillaDBResponse> for BookingResponse {
    fn from(db: BookingWithVillaDBResponse) -> Self {
        let villa = VillaSummary {
            id: db.villa_id,
            name: db.villa_name,
            slug: db.booking.villa_slug.clone(),
            category: db.villa_category,
        };
        let mut response = BookingResponse::from(db.booking);
        response.villa = Some(villa);
        response
    }
}

/// Body of a successful public reservation: `{ ok: true, booking: ... }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingCreatedResponse {
    pub ok: bool,
    pub booking: BookingResponse,
}

/// Public booking listing: `{ ok: true, list: [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingListResponse {
    pub ok: bool,
    pub list: Vec<BookingResponse>,
}

/// Booking counters shown on the panel dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingStatsResponse {
    pub total: i64,
    /// Created since the start of the current month
    pub monthly: i64,
    /// Created since the start of the current year
    pub yearly: i64,
    pub pending: i64,
    pub paid: i64,
}

/// Bulk status change over a set of booking ids.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkStatusRequest {
    #[schema(value_type = Vec<String>)]
    pub ids: Vec<BookingId>,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkStatusResponse {
    pub success: bool,
    pub updated: u64,
}

/// Bulk delete over a set of booking ids.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteRequest {
    #[schema(value_type = Vec<String>)]
    pub ids: Vec<BookingId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub deleted: u64,
}
