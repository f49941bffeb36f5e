use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::form_error;
use crate::{
    AppState,
    api::models::availability::{
        AvailabilityResponse, AvailableVilla, AvailableVillasRequest, AvailableVillasResponse, CheckAvailabilityRequest,
    },
    db::handlers::{Bookings, Repository, Villas, villas::VillaFilter},
    errors::Error,
    types::date_at_utc_midnight,
};

/// Check whether a villa is free for a stay
#[utoipa::path(
    post,
    path = "/api/check-availability",
    tag = "availability",
    request_body = CheckAvailabilityRequest,
    responses(
        (status = 200, description = "Availability verdict with conflict count", body = AvailabilityResponse),
        (status = 400, description = "Missing villa or dates"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn check_availability(
    State(state): State<AppState>,
    Json(request): Json<CheckAvailabilityRequest>,
) -> Result<Response, Error> {
    let (Some(villa_slug), Some(check_in), Some(check_out)) = (request.villa_slug, request.check_in, request.check_out) else {
        return Ok(form_error(StatusCode::BAD_REQUEST, "Villa, check-in and check-out are required"));
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Bookings::new(&mut conn);

    let conflicting = repo
        .count_overlapping(&villa_slug, date_at_utc_midnight(check_in), date_at_utc_midnight(check_out))
        .await?;

    Ok(Json(AvailabilityResponse {
        ok: true,
        available: conflicting == 0,
        conflicting_bookings: conflicting,
    })
    .into_response())
}

/// List villas that are free for a stay
#[utoipa::path(
    post,
    path = "/api/available-villas",
    tag = "availability",
    request_body = AvailableVillasRequest,
    responses(
        (status = 200, description = "Available villas, optionally filtered by category", body = AvailableVillasResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn available_villas(
    State(state): State<AppState>,
    Json(request): Json<AvailableVillasRequest>,
) -> Result<Json<AvailableVillasResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // "all" means no category filter
    let filter = match request.category.filter(|c| !c.eq_ignore_ascii_case("all")) {
        Some(category) => VillaFilter::new().with_category(category),
        None => VillaFilter::default(),
    };
    let villas = Villas::new(&mut conn).list(&filter).await?;

    // Without a date range the whole (filtered) catalog is returned
    let (Some(check_in), Some(check_out)) = (request.check_in, request.check_out) else {
        return Ok(Json(AvailableVillasResponse {
            ok: true,
            available_villas: villas
                .into_iter()
                .map(|villa| AvailableVilla {
                    villa: villa.into(),
                    available: None,
                })
                .collect(),
            total_checked: None,
            available_count: None,
        }));
    };

    let start = date_at_utc_midnight(check_in);
    let end = date_at_utc_midnight(check_out);
    let total_checked = villas.len();
    let mut available = Vec::new();
    for villa in villas {
        let conflicting = Bookings::new(&mut conn).count_overlapping(&villa.slug, start, end).await?;
        if conflicting == 0 {
            available.push(AvailableVilla {
                villa: villa.into(),
                available: Some(true),
            });
        }
    }

    Ok(Json(AvailableVillasResponse {
        ok: true,
        available_count: Some(available.len()),
        total_checked: Some(total_checked),
        available_villas: available,
    }))
}
