//! OpenAPI documentation for the booking API.
//!
//! One document covers both surfaces: the public website endpoints under
//! `/api/*` and the token-guarded panel endpoints under `/api/admin/*`.
//! The rendered reference UI is served at `/scalar`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer scheme for the admin panel endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token issued by `POST /api/admin/login`. Include it in the \
                            `Authorization` header:\n\n```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        // Public website endpoints
        api::handlers::villas::list_villas,
        api::handlers::bookings::create_booking,
        api::handlers::bookings::list_bookings,
        api::handlers::availability::check_availability,
        api::handlers::availability::available_villas,
        api::handlers::payments::init_payment,
        api::handlers::payments::payment_ok,
        api::handlers::payments::payment_fail,
        api::handlers::contact::submit_contact,
        // Channel manager
        api::handlers::channels::sync_availability,
        api::handlers::channels::booking_webhook,
        api::handlers::channels::sync_logs,
        api::handlers::channels::check_channel_availability,
        // Admin panel
        api::handlers::auth::login,
        api::handlers::villas::admin_list_villas,
        api::handlers::villas::create_villa,
        api::handlers::villas::update_villa,
        api::handlers::villas::delete_villa,
        api::handlers::bookings::admin_list_bookings,
        api::handlers::bookings::update_booking,
        api::handlers::bookings::delete_booking,
        api::handlers::bookings::booking_stats,
        api::handlers::bookings::bulk_update_status,
        api::handlers::bookings::bulk_delete,
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        api::handlers::users::user_stats,
    ),
    components(
        schemas(
            api::models::SuccessResponse,
            api::models::villas::VillaCreate,
            api::models::villas::VillaUpdate,
            api::models::villas::VillaResponse,
            api::models::villas::VillaSummary,
            api::models::bookings::BookingStatus,
            api::models::bookings::BookingCreate,
            api::models::bookings::BookingUpdate,
            api::models::bookings::BookingResponse,
            api::models::bookings::BookingCreatedResponse,
            api::models::bookings::BookingListResponse,
            api::models::bookings::BookingStatsResponse,
            api::models::bookings::BulkStatusRequest,
            api::models::bookings::BulkStatusResponse,
            api::models::bookings::BulkDeleteRequest,
            api::models::bookings::BulkDeleteResponse,
            api::models::availability::CheckAvailabilityRequest,
            api::models::availability::AvailabilityResponse,
            api::models::availability::AvailableVillasRequest,
            api::models::availability::AvailableVilla,
            api::models::availability::AvailableVillasResponse,
            api::models::payments::PaymentInitRequest,
            api::models::payments::PaymentInitResponse,
            api::models::contact::ContactRequest,
            api::models::contact::ContactResponse,
            api::models::channels::ChannelSyncRequest,
            api::models::channels::ChannelSyncResult,
            api::models::channels::ChannelSyncResponse,
            api::models::channels::ChannelBookingWebhook,
            api::models::channels::ChannelWebhookResponse,
            api::models::channels::SyncLogResponse,
            api::models::channels::SyncLogsResponse,
            api::models::channels::ChannelAvailabilityResponse,
            api::models::users::Role,
            api::models::users::UserCreate,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::models::users::UserStatsResponse,
            api::models::users::CurrentUser,
            api::models::auth::LoginRequest,
            api::models::auth::LoginResponse,
            api::models::auth::SessionUser,
        )
    ),
    tags(
        (name = "villas", description = "Public villa catalog consumed by the website."),
        (name = "bookings", description = "Reservation submission and the public booking list.

A new reservation starts in `pending`; payment callbacks and admin edits move it through `confirmed`, `paid`, or `cancelled`."),
        (name = "availability", description = "Overlap checks against existing bookings.

These checks are advisory: they read current state and do not hold any lock through the subsequent reservation."),
        (name = "payments", description = "3-D Secure hosted-payment-page flow.

`/api/init` returns a signed field set the frontend posts to the bank; the bank then calls `/api/ok` or `/api/fail`, which settle the attempt and redirect the customer's browser back to the site."),
        (name = "contact", description = "Contact form relay to the admin inbox."),
        (name = "channels", description = "External sales channel integration.

Outbound syncs block or reopen date ranges across channels; the webhook accepts reservations made on a channel and mirrors them locally."),
        (name = "admin", description = "Token-guarded panel endpoints for managing villas, bookings, and users.

Log in via `POST /api/admin/login`; only `admin`-role users receive a token."),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();

        for path in [
            "/api/villas",
            "/api/bookings",
            "/api/check-availability",
            "/api/init",
            "/api/ok",
            "/api/contact",
            "/api/channels/sync",
            "/api/channels/booking-webhook",
            "/api/admin/login",
            "/api/admin/users/stats",
        ] {
            assert!(json.contains(&format!("\"{path}\"")), "missing path {path}");
        }
        assert!(json.contains("BearerAuth"));
    }
}
