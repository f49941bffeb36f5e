use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::form_error;
use crate::{
    AppState,
    api::models::{
        SuccessResponse,
        bookings::{
            BookingCreate, BookingCreatedResponse, BookingListResponse, BookingResponse, BookingStatsResponse, BookingStatus,
            BookingUpdate, BulkDeleteRequest, BulkDeleteResponse, BulkStatusRequest, BulkStatusResponse,
        },
    },
    auth::current_user::AdminUser,
    channels::SOURCE_WEBSITE,
    db::{
        handlers::{Bookings, Repository, bookings::BookingFilter},
        models::bookings::{BookingCreateDBRequest, BookingUpdateDBRequest},
    },
    errors::Error,
    types::{BookingId, date_at_utc_midnight},
};

/// Submit a reservation request
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    request_body = BookingCreate,
    responses(
        (status = 200, description = "Reservation stored as pending", body = BookingCreatedResponse),
        (status = 400, description = "Missing fields or invalid stay range"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_booking(State(state): State<AppState>, Json(request): Json<BookingCreate>) -> Result<Response, Error> {
    let (Some(villa_slug), Some(name), Some(email), Some(from), Some(to), Some(guests), Some(amount)) = (
        request.villa_slug,
        request.name,
        request.email,
        request.from,
        request.to,
        request.guests,
        request.amount,
    ) else {
        return Ok(form_error(StatusCode::BAD_REQUEST, "Invalid fields"));
    };

    if to <= from {
        return Ok(form_error(StatusCode::BAD_REQUEST, "check_in must be before check_out"));
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let booking = repo
        .create(&BookingCreateDBRequest {
            villa_slug,
            name,
            email,
            phone: request.phone.filter(|p| !p.is_empty()),
            check_in: date_at_utc_midnight(from),
            check_out: date_at_utc_midnight(to),
            guests,
            amount,
            status: BookingStatus::Pending,
            source: SOURCE_WEBSITE.to_string(),
        })
        .await?;

    Ok(Json(BookingCreatedResponse {
        ok: true,
        booking: booking.into(),
    })
    .into_response())
}

/// List recent reservations
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "bookings",
    responses(
        (status = 200, description = "Latest 100 bookings, newest first", body = BookingListResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_bookings(State(state): State<AppState>) -> Result<Json<BookingListResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let bookings = repo.list(&BookingFilter::new(0, 100)).await?;
    Ok(Json(BookingListResponse {
        ok: true,
        list: bookings.into_iter().map(BookingResponse::from).collect(),
    }))
}

/// List all bookings with their villa for the admin panel
#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    tag = "admin",
    responses(
        (status = 200, description = "All bookings, newest first", body = [BookingResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn admin_list_bookings(State(state): State<AppState>, _: AdminUser) -> Result<Json<Vec<BookingResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let bookings = repo.list_with_villas().await?;
    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// Update a booking
#[utoipa::path(
    put,
    path = "/api/admin/bookings/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Booking ID")),
    request_body = BookingUpdate,
    responses(
        (status = 200, description = "Booking updated", body = BookingResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Booking not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
    _: AdminUser,
    Json(request): Json<BookingUpdate>,
) -> Result<Json<BookingResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let booking = repo
        .update(
            id,
            &BookingUpdateDBRequest {
                villa_slug: request.villa_slug,
                name: request.name,
                email: request.email,
                phone: request.phone,
                check_in: request.check_in.map(date_at_utc_midnight),
                check_out: request.check_out.map(date_at_utc_midnight),
                guests: request.guests,
                amount: request.amount,
                status: request.status,
                source: request.source,
            },
        )
        .await?;

    Ok(Json(BookingResponse::from(booking)))
}

/// Delete a booking
#[utoipa::path(
    delete,
    path = "/api/admin/bookings/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking deleted", body = SuccessResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Booking not found"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
    _: AdminUser,
) -> Result<Json<SuccessResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    match repo.delete(id).await? {
        true => Ok(Json(SuccessResponse::new())),
        false => Err(Error::NotFound {
            resource: "Booking".to_string(),
            id: id.to_string(),
        }),
    }
}

/// Booking statistics for the dashboard
#[utoipa::path(
    get,
    path = "/api/admin/bookings/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Booking counters", body = BookingStatsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn booking_stats(State(state): State<AppState>, _: AdminUser) -> Result<Json<BookingStatsResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let stats = repo.stats().await?;
    Ok(Json(BookingStatsResponse {
        total: stats.total,
        monthly: stats.monthly,
        yearly: stats.yearly,
        pending: stats.pending,
        paid: stats.paid,
    }))
}

/// Set the status of several bookings at once
#[utoipa::path(
    post,
    path = "/api/admin/bookings/bulk-status",
    tag = "admin",
    request_body = BulkStatusRequest,
    responses(
        (status = 200, description = "Statuses updated", body = BulkStatusResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn bulk_update_status(
    State(state): State<AppState>,
    _: AdminUser,
    Json(request): Json<BulkStatusRequest>,
) -> Result<Json<BulkStatusResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let updated = repo.bulk_update_status(&request.ids, request.status).await?;
    Ok(Json(BulkStatusResponse { success: true, updated }))
}

/// Delete several bookings at once
#[utoipa::path(
    post,
    path = "/api/admin/bookings/bulk-delete",
    tag = "admin",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Bookings deleted", body = BulkDeleteResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Forbidden"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn bulk_delete(
    State(state): State<AppState>,
    _: AdminUser,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let deleted = repo.bulk_delete(&request.ids).await?;
    Ok(Json(BulkDeleteResponse { success: true, deleted }))
}
