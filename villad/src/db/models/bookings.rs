//! Database models for bookings.

use crate::api::models::bookings::BookingStatus;
use crate::types::{BookingId, VillaId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a new booking
#[derive(Debug, Clone)]
pub struct BookingCreateDBRequest {
    pub villa_slug: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
    pub amount: Decimal,
    pub status: BookingStatus,
    pub source: String,
}

/// Database request for updating a booking
#[derive(Debug, Clone, Default)]
pub struct BookingUpdateDBRequest {
    pub villa_slug: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub guests: Option<i32>,
    pub amount: Option<Decimal>,
    pub status: Option<BookingStatus>,
    pub source: Option<String>,
}

/// Database response for a booking
#[derive(Debug, Clone)]
pub struct BookingDBResponse {
    pub id: BookingId,
    pub villa_slug: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
    pub amount: Decimal,
    pub status: BookingStatus,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// A booking joined with summary columns of its villa, for the admin listing
#[derive(Debug, Clone)]
pub struct BookingWithVillaDBResponse {
    pub booking: BookingDBResponse,
    pub villa_id: VillaId,
    pub villa_name: String,
    pub villa_category: String,
}

/// Counters backing the dashboard stats endpoint
#[derive(Debug, Clone)]
pub struct BookingStatsDBResponse {
    pub total: i64,
    pub monthly: i64,
    pub yearly: i64,
    pub pending: i64,
    pub paid: i64,
}
