//! Test utilities for integration testing (available with `test-utils` feature).

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::{
        bookings::BookingStatus,
        users::{CurrentUser, Role},
    },
    auth::{password, session},
    config::{AuthConfig, ChannelsConfig, Config, EmailConfig, EmailTransportConfig, GatewayConfig},
    db::{
        handlers::{Bookings, Repository, Users, Villas},
        models::{
            bookings::{BookingCreateDBRequest, BookingDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
            villas::{VillaCreateDBRequest, VillaDBResponse},
        },
    },
    email::EmailService,
    types::date_at_utc_midnight,
};

/// Password for every user the test helpers create.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn create_test_config() -> Config {
    // Use temp directory for test emails
    let temp_dir = std::env::temp_dir().join(format!("villad-test-emails-{}", std::process::id()));

    Config {
        auth: AuthConfig {
            secret_key: Some("test-secret-key-for-testing-only".to_string()),
            ..Default::default()
        },
        email: EmailConfig {
            transport: EmailTransportConfig::File {
                path: temp_dir.to_string_lossy().to_string(),
            },
            ..Default::default()
        },
        gateway: GatewayConfig {
            client_id: "700655000200".to_string(),
            store_key: "TEST_STORE_KEY".to_string(),
            ok_url: "https://api.example.test/api/ok".to_string(),
            fail_url: "https://api.example.test/api/fail".to_string(),
            front_ok: "https://example.test/payment/success".to_string(),
            front_fail: "https://example.test/payment/failure".to_string(),
            ..Default::default()
        },
        channels: ChannelsConfig {
            properties: HashMap::from([
                ("BOOKING_PROPERTY_ID_1".to_string(), "vip-1".to_string()),
                ("BOOKING_PROPERTY_ID_4".to_string(), "premium-1".to_string()),
            ]),
        },
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool) -> AppState {
    let config = create_test_config();
    let email = Arc::new(EmailService::new(&config).expect("Failed to create test email service"));

    AppState::builder().db(pool).config(config).email(email).build()
}

/// Build a test server around a fresh router plus the state behind it.
pub async fn create_test_app(pool: PgPool) -> (TestServer, AppState) {
    let state = create_test_state(pool);
    let router = crate::build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state)
}

pub async fn create_test_admin_user(pool: &PgPool) -> UserDBResponse {
    create_user_with_role(pool, Role::Admin).await
}

pub async fn create_test_user(pool: &PgPool) -> UserDBResponse {
    create_user_with_role(pool, Role::Staff).await
}

async fn create_user_with_role(pool: &PgPool, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);

    let suffix = Uuid::new_v4().simple().to_string();
    let prefix = match role {
        Role::Admin => "testadmin",
        Role::Staff => "teststaff",
    };
    let password_hash = password::hash_string(TEST_PASSWORD).expect("Failed to hash test password");

    users_repo
        .create(&UserCreateDBRequest {
            email: format!("{prefix}_{suffix}@example.com"),
            password_hash,
            name: "Test User".to_string(),
            role,
        })
        .await
        .expect("Failed to create test user")
}

/// Authorization header carrying a fresh session token for `user`.
pub fn auth_header(user: &UserDBResponse, config: &Config) -> (HeaderName, HeaderValue) {
    let token = session::create_session_token(&CurrentUser::from(user.clone()), config).expect("Failed to create session token");
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("Failed to build header value");
    (header::AUTHORIZATION, value)
}

pub async fn seed_test_villa(pool: &PgPool, slug: &str, name: &str, category: &str) -> VillaDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut villas_repo = Villas::new(&mut conn);

    villas_repo
        .create(&VillaCreateDBRequest {
            slug: slug.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price: Decimal::new(24000, 2),
            description: Some(format!("{name} with pool and sea view")),
        })
        .await
        .expect("Failed to seed villa")
}

pub async fn seed_test_booking(
    pool: &PgPool,
    villa_slug: &str,
    check_in: &str,
    check_out: &str,
    status: BookingStatus,
) -> BookingDBResponse {
    let check_in: NaiveDate = check_in.parse().expect("Invalid check-in date");
    let check_out: NaiveDate = check_out.parse().expect("Invalid check-out date");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut bookings_repo = Bookings::new(&mut conn);

    bookings_repo
        .create(&BookingCreateDBRequest {
            villa_slug: villa_slug.to_string(),
            name: "Test Guest".to_string(),
            email: "guest@example.com".to_string(),
            phone: Some("+383 44 123 456".to_string()),
            check_in: date_at_utc_midnight(check_in),
            check_out: date_at_utc_midnight(check_out),
            guests: 2,
            amount: Decimal::new(96000, 2),
            status,
            source: "website".to_string(),
        })
        .await
        .expect("Failed to seed booking")
}
