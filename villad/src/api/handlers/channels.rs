use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::form_error;
use crate::{
    AppState,
    api::models::{
        bookings::BookingResponse,
        channels::{
            ChannelAvailabilityResponse, ChannelBookingWebhook, ChannelSyncRequest, ChannelSyncResponse,
            ChannelSyncResult, ChannelWebhookResponse, SyncLogResponse, SyncLogsQuery, SyncLogsResponse,
        },
    },
    channels::{self, InboundBooking},
    db::{
        handlers::{AvailabilityOverrides, Bookings, SyncLogs, sync_logs::SyncLogFilter},
        models::bookings::BookingDBResponse,
    },
    errors::Error,
    types::date_at_utc_midnight,
};

const SYNC_LOG_LIMIT_DEFAULT: i64 = 50;
const SYNC_LOG_LIMIT_MAX: i64 = 500;

/// Push an availability change to all channels
///
/// Blocks (or re-opens) a date range locally and mirrors the change to the
/// connected channels, leaving a sync-log entry behind.
#[utoipa::path(
    post,
    path = "/api/channels/sync",
    tag = "channels",
    request_body = ChannelSyncRequest,
    responses(
        (status = 200, description = "Range synced", body = ChannelSyncResponse),
        (status = 400, description = "Missing villa or dates"),
        (status = 500, description = "Sync failed"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn sync_availability(State(state): State<AppState>, Json(request): Json<ChannelSyncRequest>) -> Response {
    let (Some(villa_slug), Some(check_in), Some(check_out)) = (request.villa_slug, request.check_in, request.check_out)
    else {
        return form_error(StatusCode::BAD_REQUEST, "Villa, check-in and check-out are required");
    };
    let available = request.available.unwrap_or(false);

    let result = async {
        let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
        channels::sync_availability(&mut tx, &villa_slug, check_in, check_out, available).await?;
        tx.commit().await.map_err(|e| Error::Database(e.into()))
    }
    .await;

    match result {
        Ok(()) => Json(ChannelSyncResponse {
            ok: true,
            message: "Availability synced across all channels".to_string(),
            result: ChannelSyncResult { success: true },
        })
        .into_response(),
        Err(e) => {
            tracing::error!("channel sync for '{villa_slug}' failed: {e:#}");
            form_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to sync availability")
        }
    }
}

/// Accept a reservation pushed by an external channel
///
/// The channel's property id is resolved to a villa slug through
/// configuration. A valid payload creates a confirmed booking, blocks the
/// stay on every channel, and notifies the admin by email.
#[utoipa::path(
    post,
    path = "/api/channels/booking-webhook",
    tag = "channels",
    request_body = ChannelBookingWebhook,
    responses(
        (status = 200, description = "Booking created", body = ChannelWebhookResponse),
        (status = 400, description = "Unknown property id or invalid payload"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn booking_webhook(State(state): State<AppState>, Json(request): Json<ChannelBookingWebhook>) -> Response {
    let villa_slug = request
        .property_id
        .as_deref()
        .and_then(|property_id| state.config.channels.villa_slug_for(property_id));
    let Some(villa_slug) = villa_slug else {
        tracing::warn!("webhook for unmapped property id {:?}", request.property_id);
        return form_error(StatusCode::BAD_REQUEST, "Unknown property id");
    };

    let (Some(name), Some(email), Some(check_in), Some(check_out), Some(guests), Some(amount)) = (
        request.guest_name.clone(),
        request.guest_email.clone(),
        request.checkin_date,
        request.checkout_date,
        request.guest_count,
        request.total_amount,
    ) else {
        return form_error(StatusCode::BAD_REQUEST, "Invalid webhook payload");
    };
    if check_in >= check_out {
        return form_error(StatusCode::BAD_REQUEST, "Invalid webhook payload");
    }

    let inbound = InboundBooking {
        villa_slug: villa_slug.to_string(),
        name,
        email,
        phone: request.guest_phone.clone().filter(|phone| !phone.is_empty()),
        check_in,
        check_out,
        guests,
        amount,
    };

    let booking = match process_channel_booking(&state, &inbound).await {
        Ok(booking) => booking,
        Err(e) => {
            tracing::error!("channel booking for '{}' failed: {e:#}", inbound.villa_slug);
            return form_error(StatusCode::BAD_REQUEST, "Webhook processing failed");
        }
    };

    let email_service = state.email.clone();
    let booking_for_email = booking.clone();
    let channel_reference = request.booking_id.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_booking_notification(&booking_for_email, channel_reference.as_deref())
            .await
        {
            tracing::warn!("channel booking notification failed: {e:#}");
        }
    });

    Json(ChannelWebhookResponse {
        ok: true,
        message: "Booking processed successfully".to_string(),
        booking: BookingResponse::from(booking),
    })
    .into_response()
}

async fn process_channel_booking(state: &AppState, inbound: &InboundBooking) -> Result<BookingDBResponse, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let booking = channels::accept_booking(&mut tx, inbound, channels::SOURCE_BOOKING_COM).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(booking)
}

/// Recent channel sync history
#[utoipa::path(
    get,
    path = "/api/channels/sync-logs",
    tag = "channels",
    params(
        ("limit" = Option<i64>, Query, description = "Max entries to return (default 50)"),
        ("villaSlug" = Option<String>, Query, description = "Only entries for this villa"),
    ),
    responses((status = 200, description = "Sync log entries, newest first", body = SyncLogsResponse))
)]
#[tracing::instrument(skip_all)]
pub async fn sync_logs(
    State(state): State<AppState>,
    Query(query): Query<SyncLogsQuery>,
) -> Result<Json<SyncLogsResponse>, Error> {
    let limit = query.limit.unwrap_or(SYNC_LOG_LIMIT_DEFAULT).clamp(1, SYNC_LOG_LIMIT_MAX);
    let mut filter = SyncLogFilter::new(limit);
    if let Some(villa_slug) = query.villa_slug {
        filter = filter.with_villa_slug(villa_slug);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let logs = SyncLogs::new(&mut conn).list(&filter).await?;
    let logs: Vec<SyncLogResponse> = logs.into_iter().map(SyncLogResponse::from).collect();
    let count = logs.len();

    Ok(Json(SyncLogsResponse { ok: true, logs, count }))
}

/// Check availability across all channels
///
/// Like the public availability check, but also counts days blocked by
/// channel syncs; a single blocked day makes the range unavailable.
#[utoipa::path(
    post,
    path = "/api/channels/check-availability",
    tag = "channels",
    request_body = ChannelSyncRequest,
    responses(
        (status = 200, description = "Cross-channel availability verdict", body = ChannelAvailabilityResponse),
        (status = 400, description = "Missing villa or dates"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn check_channel_availability(
    State(state): State<AppState>,
    Json(request): Json<ChannelSyncRequest>,
) -> Result<Response, Error> {
    let (Some(villa_slug), Some(check_in), Some(check_out)) = (request.villa_slug, request.check_in, request.check_out)
    else {
        return Ok(form_error(StatusCode::BAD_REQUEST, "Villa, check-in and check-out are required"));
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let conflicting = Bookings::new(&mut conn)
        .count_overlapping(&villa_slug, date_at_utc_midnight(check_in), date_at_utc_midnight(check_out))
        .await?;
    let blocked = AvailabilityOverrides::new(&mut conn)
        .blocked_in_range(&villa_slug, check_in, check_out)
        .await?;

    Ok(Json(ChannelAvailabilityResponse {
        ok: true,
        available: conflicting == 0 && blocked.blocked_dates == 0,
        conflicting_bookings: conflicting,
        blocked_dates: blocked.blocked_dates,
        sources: blocked.sources,
    })
    .into_response())
}
