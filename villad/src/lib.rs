//! # villad: Booking Backend for Holiday Villas
//!
//! `villad` is the API backend for a small villa-rental business. A single HTTP
//! service powers the public booking website, a hosted-payment checkout flow, a
//! channel-manager integration for OTA platforms, and the staff admin panel.
//!
//! ## Overview
//!
//! The public website lists villas, checks availability for a stay, and records
//! booking requests. Checkout happens off-site: the backend prepares a signed
//! form for the payment gateway's hosted page, the guest pays there, and the
//! gateway calls back with the result, which settles the payment attempt and
//! marks the linked booking paid. OTA platforms such as Booking.com reach the
//! service through a channel-manager surface that pushes reservations in and
//! keeps the availability calendar closed across channels. Staff manage villas,
//! bookings, and panel accounts through a token-guarded admin API.
//!
//! ### What It Does
//!
//! At its core, `villad` answers availability checks by counting overlapping
//! reservations and channel-synced calendar blocks, records booking requests,
//! and tracks each hosted-payment order from the signed form to the gateway's
//! callback. A success callback settles the stored attempt, transitions the
//! linked booking, and redirects the guest back to the website with the
//! outcome; staff are notified by email, best-effort. Inbound channel
//! reservations are stored like direct bookings and immediately block their
//! dates, and every channel operation is recorded in a sync log for the panel
//! to inspect.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the
//! HTTP layer and uses PostgreSQL for all persistence. Migrations are bundled
//! into the binary and run automatically on startup.
//!
//! ### Request Flow
//!
//! Public website endpoints under `/api/*` are unauthenticated and follow a
//! plain handler-to-repository flow: deserialize the request, open a connection
//! or transaction from the pool, and call the matching repository. Payment
//! callbacks at `/api/ok` and `/api/fail` are posted by the gateway, not the
//! guest's browser session, so they carry no credentials either; the signed
//! hash in the form body is the authentication. Channel-manager endpoints under
//! `/api/channels/*` are called server-to-server by the channel manager.
//!
//! Admin panel requests under `/api/admin/*` pass through bearer-token
//! extraction: a JWT issued by `POST /api/admin/login` is validated and the
//! requesting user loaded into the handler as [`auth::current_user::AdminUser`]
//! or [`auth::current_user::CurrentUser`]. Role checks happen in the extractor,
//! so a handler that takes `AdminUser` never runs for a staff token.
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) holds the HTTP handlers and the request/response
//! models they serialize. The **authentication layer** ([`auth`]) covers Argon2
//! password hashing, JWT session tokens, and the request extractors. The
//! **database layer** ([`db`]) uses the repository pattern: each entity has a
//! repository struct over a `PgConnection` so handlers can compose them inside
//! one transaction. The **gateway module** ([`gateway`]) implements the hosted
//! payment page's signed-form protocol, and [`email`] delivers the booking,
//! payment, and contact notifications over SMTP or to files for development.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use villad::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = villad::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and runs migrations on
//! startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! // Run migrations
//! villad::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
mod channels;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod gateway;
mod openapi;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    config::CorsOrigin,
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    email::EmailService,
    errors::Error,
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument};
pub use types::{BookingId, PaymentAttemptId, SyncLogId, UserId, VillaId};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Shared state available to every request handler.
#[derive(Clone, Builder)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Config,
    /// Outbound email delivery
    pub email: Arc<EmailService>,
}

/// Returns the migrator for the database migrations bundled with this crate.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user for the panel, or rotate its password.
///
/// Idempotent: if a user with `email` already exists its password is reset to
/// `password`, otherwise a fresh admin account is created. The check and the
/// write run in one transaction.
///
/// # Example
///
/// ```no_run
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let user_id = villad::create_initial_admin_user(
///     "admin@holidayvillas.com",
///     "admin123",
///     &pool
/// ).await?;
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: &str, db: &PgPool) -> Result<UserId, Error> {
    let password_hash = password::hash_string(password)?;

    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_user_by_email(email).await? {
        users
            .update(
                existing.id,
                &UserUpdateDBRequest {
                    email: None,
                    name: None,
                    role: None,
                    password_hash: Some(password_hash),
                },
            )
            .await?;
        tx.commit().await.map_err(|e| Error::Database(e.into()))?;
        return Ok(existing.id);
    }

    let created = users
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            password_hash,
            name: "Admin".to_string(),
            role: Role::Admin,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(created.id)
}

/// Connect to PostgreSQL, run migrations, and bootstrap the admin account.
///
/// Pool sizing and timeouts come from `database.pool` in the configuration.
/// The admin account is only touched when both `auth.admin_email` and
/// `auth.admin_password` are set.
pub async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(settings.max_lifetime_secs))
        .connect(&config.database.url)
        .await?;

    info!("Running database migrations...");
    migrator().run(&pool).await?;

    if let (Some(email), Some(password)) = (config.auth.admin_email.as_deref(), config.auth.admin_password.as_deref()) {
        let user_id = create_initial_admin_user(email, password, &pool).await?;
        info!("Admin account ready for {email} ({user_id})");
    }

    Ok(pool)
}

/// Build the CORS layer from the configured origins.
///
/// The booking website runs on a different domain than the API, so the layer
/// has to name the methods and headers the browser will preflight. `Location`
/// is exposed for the payment redirects.
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.server.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            // Origin headers never carry a path, so serialize just the origin part
            CorsOrigin::Url(url) => url.origin().ascii_serialization().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(config.server.cors.allow_credentials)
        .expose_headers(vec![header::LOCATION]);

    Ok(cors)
}

/// Assemble the full application router.
///
/// Route guards live in the handlers themselves (via the extractors in
/// [`auth::current_user`]), so this is a flat table: public website endpoints,
/// the payment gateway's callbacks, the channel-manager surface, and the admin
/// panel, plus the API reference at `/scalar`.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/health", get(|| async { Json(serde_json::json!({ "ok": true })) }))
        // Public website endpoints
        .route("/api/villas", get(api::handlers::villas::list_villas))
        .route(
            "/api/bookings",
            post(api::handlers::bookings::create_booking).get(api::handlers::bookings::list_bookings),
        )
        .route("/api/check-availability", post(api::handlers::availability::check_availability))
        .route("/api/available-villas", post(api::handlers::availability::available_villas))
        .route("/api/contact", post(api::handlers::contact::submit_contact))
        // Hosted payment page: form preparation plus the gateway's callbacks.
        // The gateway posts the result, but some builds redirect the browser
        // with GET, so both callbacks accept either method.
        .route("/api/init", post(api::handlers::payments::init_payment))
        .route(
            "/api/ok",
            get(api::handlers::payments::payment_ok).post(api::handlers::payments::payment_ok),
        )
        .route(
            "/api/fail",
            get(api::handlers::payments::payment_fail).post(api::handlers::payments::payment_fail),
        )
        // Channel manager integration
        .route("/api/channels/sync", post(api::handlers::channels::sync_availability))
        .route("/api/channels/booking-webhook", post(api::handlers::channels::booking_webhook))
        .route("/api/channels/sync-logs", get(api::handlers::channels::sync_logs))
        .route(
            "/api/channels/check-availability",
            post(api::handlers::channels::check_channel_availability),
        )
        // Admin panel
        .route("/api/admin/login", post(api::handlers::auth::login))
        .route(
            "/api/admin/villas",
            get(api::handlers::villas::admin_list_villas).post(api::handlers::villas::create_villa),
        )
        .route(
            "/api/admin/villas/{id}",
            put(api::handlers::villas::update_villa).delete(api::handlers::villas::delete_villa),
        )
        .route("/api/admin/bookings", get(api::handlers::bookings::admin_list_bookings))
        .route("/api/admin/bookings/stats", get(api::handlers::bookings::booking_stats))
        .route("/api/admin/bookings/bulk-status", post(api::handlers::bookings::bulk_update_status))
        .route("/api/admin/bookings/bulk-delete", post(api::handlers::bookings::bulk_delete))
        .route(
            "/api/admin/bookings/{id}",
            put(api::handlers::bookings::update_booking).delete(api::handlers::bookings::delete_booking),
        )
        .route(
            "/api/admin/users",
            get(api::handlers::users::list_users).post(api::handlers::users::create_user),
        )
        .route("/api/admin/users/stats", get(api::handlers::users::user_stats))
        .route(
            "/api/admin/users/{id}",
            put(api::handlers::users::update_user).delete(api::handlers::users::delete_user),
        )
        .with_state(state.clone())
        // API reference UI plus the raw document
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let router = router.layer(create_cors_layer(&state.config)?);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Container for the running application.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting booking backend with configuration: {:#?}", config);

        // Connect to the database, run migrations, and bootstrap the admin account
        let pool = setup_database(&config).await?;

        let email = Arc::new(EmailService::new(&config)?);

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).email(email).build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Booking backend listening on http://{bind_addr}");

        // Run the server with graceful shutdown
        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
