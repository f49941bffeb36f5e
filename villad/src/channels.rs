//! Channel manager: keeps villa availability aligned across sales channels.
//!
//! Two flows meet here. Outbound: an availability change (manual sync or a
//! new booking) is written to the local override table, pushed to the
//! external channel, and recorded in the sync log. Inbound: a webhook
//! booking is stored as `confirmed` and its dates are blocked through the
//! same outbound path.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    api::models::bookings::BookingStatus,
    db::{
        handlers::{AvailabilityOverrides, Bookings, Repository, SyncLogs},
        models::{
            bookings::{BookingCreateDBRequest, BookingDBResponse},
            sync_logs::SyncLogCreateDBRequest,
        },
    },
    errors::Error,
    types::date_at_utc_midnight,
};

/// Source tag for bookings made through the site's own reservation form.
pub const SOURCE_WEBSITE: &str = "website";
/// Source tag for the external channel, used on webhook bookings and on
/// the override rows their stays produce.
pub const SOURCE_BOOKING_COM: &str = "booking_com";
/// Source tag on sync log rows, marking them as written by this module.
pub const SOURCE_CHANNEL_MANAGER: &str = "channel_manager";

/// An inbound channel booking after its property id has been resolved to a
/// villa slug and the payload has been validated.
#[derive(Debug, Clone)]
pub struct InboundBooking {
    pub villa_slug: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub amount: Decimal,
}

/// Synchronize availability for a date range across all channels.
///
/// Blocking writes one override row per day in `[check_in, check_out)`;
/// unblocking deletes the rows again. Every call appends a sync log entry,
/// whether or not any day actually changed.
#[instrument(skip(db), err)]
pub async fn sync_availability(
    db: &mut PgConnection,
    villa_slug: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    available: bool,
) -> Result<(), Error> {
    if available {
        let removed = AvailabilityOverrides::new(db)
            .unblock_range(villa_slug, check_in, check_out)
            .await?;
        tracing::debug!("unblocked {removed} day(s) for villa '{villa_slug}'");
    } else {
        let blocked = AvailabilityOverrides::new(db)
            .block_range(villa_slug, check_in, check_out, SOURCE_BOOKING_COM)
            .await?;
        tracing::debug!("blocked {blocked} day(s) for villa '{villa_slug}'");
    }

    push_to_booking_com(villa_slug, check_in, check_out, available);

    SyncLogs::new(db)
        .create(&SyncLogCreateDBRequest {
            villa_slug: villa_slug.to_string(),
            check_in: date_at_utc_midnight(check_in),
            check_out: date_at_utc_midnight(check_out),
            available,
            source: SOURCE_CHANNEL_MANAGER.to_string(),
        })
        .await?;

    Ok(())
}

/// Store an inbound booking as `confirmed` and block its stay on all
/// channels.
///
/// Used for webhook bookings, which arrive already paid for on the channel's
/// side. Website reservations go through the public booking endpoint instead
/// and start out `pending`.
#[instrument(skip(db, inbound), fields(villa_slug = %inbound.villa_slug), err)]
pub async fn accept_booking(
    db: &mut PgConnection,
    inbound: &InboundBooking,
    source: &str,
) -> Result<BookingDBResponse, Error> {
    let booking = Bookings::new(db)
        .create(&BookingCreateDBRequest {
            villa_slug: inbound.villa_slug.clone(),
            name: inbound.name.clone(),
            email: inbound.email.clone(),
            phone: inbound.phone.clone(),
            check_in: date_at_utc_midnight(inbound.check_in),
            check_out: date_at_utc_midnight(inbound.check_out),
            guests: inbound.guests,
            amount: inbound.amount,
            status: BookingStatus::Confirmed,
            source: source.to_string(),
        })
        .await?;

    sync_availability(db, &inbound.villa_slug, inbound.check_in, inbound.check_out, false).await?;

    Ok(booking)
}

/// Push an availability change to Booking.com.
///
/// TODO: call the channel's availability API here once merchant credentials
/// are provisioned; until then the push is log-only.
fn push_to_booking_com(villa_slug: &str, check_in: NaiveDate, check_out: NaiveDate, available: bool) {
    tracing::info!("[booking.com sync] {villa_slug}: {check_in} to {check_out} - available: {available}");
}
