use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Form, State, rejection::FormRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    AppState,
    api::models::{
        bookings::BookingStatus,
        payments::{PaymentInitRequest, PaymentInitResponse},
    },
    db::{
        handlers::{Bookings, PaymentAttempts, Repository},
        models::{
            bookings::BookingUpdateDBRequest,
            payment_attempts::{PaymentAttemptCreateDBRequest, PaymentStatus},
        },
    },
    errors::Error,
    gateway,
};

/// Start a hosted payment page session
///
/// Returns the gateway URL and the signed form fields the frontend
/// auto-submits to the bank.
#[utoipa::path(
    post,
    path = "/api/init",
    tag = "payments",
    request_body = PaymentInitRequest,
    responses(
        (status = 200, description = "Signed form fields for the hosted payment page", body = PaymentInitResponse),
        (status = 400, description = "Missing or non-positive amount"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn init_payment(
    State(state): State<AppState>,
    Json(request): Json<PaymentInitRequest>,
) -> Result<Json<PaymentInitResponse>, Error> {
    let amount = request
        .amount
        .filter(|amount| amount.is_sign_positive() && !amount.is_zero())
        .ok_or_else(|| Error::BadRequest {
            message: "amount_required".to_string(),
        })?;
    let email = request.email.unwrap_or_default();
    let meta = request.meta.unwrap_or_default();

    // Metadata values become plain form fields, so flatten them to strings
    let extra: BTreeMap<String, String> = meta
        .iter()
        .map(|(key, value)| {
            let flat = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), flat)
        })
        .collect();

    let form = gateway::build_payment_form(&state.config.gateway, amount, &email, &extra);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    PaymentAttempts::new(&mut conn)
        .create(&PaymentAttemptCreateDBRequest {
            oid: form.oid.clone(),
            amount,
            currency: state.config.gateway.currency.clone(),
            email,
            metadata: Value::Object(serde_json::Map::from_iter(meta)),
        })
        .await?;

    Ok(Json(PaymentInitResponse {
        gate: form.gate,
        fields: form.fields,
        oid: form.oid,
    }))
}

/// Bank success callback
///
/// Settles the payment attempt, marks a linked booking as paid, notifies the
/// admin, and sends the browser back to the frontend success page. Nothing in
/// here may stop the redirect; failures are logged instead.
#[utoipa::path(
    post,
    path = "/api/ok",
    tag = "payments",
    responses((status = 302, description = "Redirect to the frontend success page"))
)]
#[tracing::instrument(skip_all)]
pub async fn payment_ok(
    State(state): State<AppState>,
    form: Result<Form<BTreeMap<String, String>>, FormRejection>,
) -> Response {
    let fields = form.map(|Form(fields)| fields).unwrap_or_default();
    let oid = callback_oid(&fields);
    let target = append_query(&state.config.gateway.front_ok, &[("oid", &oid)]);

    if let Err(e) = settle_success(&state, &oid).await {
        tracing::error!("failed to settle payment attempt '{oid}': {e:#}");
    }

    let email = state.email.clone();
    let email_fields = fields.clone();
    let email_target = target.clone();
    tokio::spawn(async move {
        email.notify_payment("OK", &email_fields, Some(&email_target)).await;
    });

    (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
}

/// Bank failure callback
///
/// Settles the attempt as failed and redirects to the frontend failure page
/// with the gateway's error message attached.
#[utoipa::path(
    post,
    path = "/api/fail",
    tag = "payments",
    responses((status = 302, description = "Redirect to the frontend failure page"))
)]
#[tracing::instrument(skip_all)]
pub async fn payment_fail(
    State(state): State<AppState>,
    form: Result<Form<BTreeMap<String, String>>, FormRejection>,
) -> Response {
    let fields = form.map(|Form(fields)| fields).unwrap_or_default();
    let oid = callback_oid(&fields);
    let msg = fields
        .get("msg")
        .or_else(|| fields.get("ErrMsg"))
        .or_else(|| fields.get("Response"))
        .cloned()
        .unwrap_or_else(|| "Payment failed".to_string());
    let target = append_query(&state.config.gateway.front_fail, &[("oid", &oid), ("msg", &msg)]);

    if let Err(e) = settle_failure(&state, &oid).await {
        tracing::error!("failed to settle payment attempt '{oid}': {e:#}");
    }

    let email = state.email.clone();
    let email_fields = fields.clone();
    let email_target = target.clone();
    tokio::spawn(async move {
        email.notify_payment("FAIL", &email_fields, Some(&email_target)).await;
    });

    (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
}

fn callback_oid(fields: &BTreeMap<String, String>) -> String {
    fields
        .get("oid")
        .or_else(|| fields.get("OrderId"))
        .cloned()
        .unwrap_or_default()
}

/// Append query parameters to a frontend URL that may already carry some.
fn append_query(base: &str, params: &[(&str, &str)]) -> String {
    let mut target = String::from(base);
    let mut separator = if base.contains('?') { '&' } else { '?' };
    for (key, value) in params {
        let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
        target.push(separator);
        target.push_str(key);
        target.push('=');
        target.push_str(&encoded);
        separator = '&';
    }
    target
}

async fn settle_success(state: &AppState, oid: &str) -> Result<(), Error> {
    if oid.is_empty() {
        tracing::warn!("success callback without an order id");
        return Ok(());
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let Some(attempt) = PaymentAttempts::new(&mut conn).settle(oid, PaymentStatus::Ok).await? else {
        tracing::warn!("success callback for unknown order id '{oid}'");
        return Ok(());
    };

    // A booking reference passed through the init metadata gets marked paid
    let booking_id = attempt
        .metadata
        .get("bookingId")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok());
    if let Some(booking_id) = booking_id {
        Bookings::new(&mut conn)
            .update(
                booking_id,
                &BookingUpdateDBRequest {
                    status: Some(BookingStatus::Paid),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!("marked booking {booking_id} as paid for order '{oid}'");
    }

    Ok(())
}

async fn settle_failure(state: &AppState, oid: &str) -> Result<(), Error> {
    if oid.is_empty() {
        tracing::warn!("failure callback without an order id");
        return Ok(());
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if PaymentAttempts::new(&mut conn).settle(oid, PaymentStatus::Fail).await?.is_none() {
        tracing::warn!("failure callback for unknown order id '{oid}'");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::api::models::bookings::BookingStatus;
    use crate::db::handlers::{Bookings, PaymentAttempts, Repository};
    use crate::db::models::payment_attempts::{PaymentAttemptCreateDBRequest, PaymentStatus};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    async fn seed_attempt(pool: &PgPool, oid: &str, metadata: serde_json::Value) {
        let mut conn = pool.acquire().await.unwrap();
        PaymentAttempts::new(&mut conn)
            .create(&PaymentAttemptCreateDBRequest {
                oid: oid.to_string(),
                amount: Decimal::new(96000, 2),
                currency: "978".to_string(),
                email: "guest@example.com".to_string(),
                metadata,
            })
            .await
            .unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_init_returns_signed_fields_and_persists_attempt(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;

        let response = app
            .post("/api/init")
            .json(&json!({
                "amount": "960.00",
                "email": "guest@example.com",
                "meta": { "bookingId": "5a8b1d6e-0f2c-4f0a-9d55-1f1e2a3b4c5d" }
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["gate"], state.config.gateway.gate_url.as_str());
        let oid = body["oid"].as_str().unwrap();
        assert_eq!(oid.len(), 20);

        let fields = body["fields"].as_object().unwrap();
        assert_eq!(fields["amount"], "960.00");
        assert_eq!(fields["storetype"], "3D_PAY_HOSTING");
        assert_eq!(fields["bookingId"], "5a8b1d6e-0f2c-4f0a-9d55-1f1e2a3b4c5d");
        assert!(!fields["hash"].as_str().unwrap().is_empty());

        let mut conn = pool.acquire().await.unwrap();
        let attempt = PaymentAttempts::new(&mut conn).get_by_oid(oid).await.unwrap().unwrap();
        assert_eq!(attempt.status, PaymentStatus::Initiated);
        assert_eq!(attempt.metadata["bookingId"], "5a8b1d6e-0f2c-4f0a-9d55-1f1e2a3b4c5d");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_init_requires_positive_amount(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone()).await;

        let response = app.post("/api/init").json(&json!({ "email": "guest@example.com" })).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<serde_json::Value>()["error"], "amount_required");

        let response = app.post("/api/init").json(&json!({ "amount": "0.00" })).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<serde_json::Value>()["error"], "amount_required");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_success_callback_settles_and_redirects(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        seed_test_villa(&pool, "vip-1", "VIP 1", "VIP").await;
        let booking = seed_test_booking(&pool, "vip-1", "2025-11-01", "2025-11-05", BookingStatus::Pending).await;
        seed_attempt(&pool, "ORDER1234567890ABCDE", json!({ "bookingId": booking.id })).await;

        let response = app
            .get("/api/ok")
            .add_query_param("oid", "ORDER1234567890ABCDE")
            .add_query_param("ProcReturnCode", "00")
            .await;

        response.assert_status(StatusCode::FOUND);
        let location = response.header("location");
        let location = location.to_str().unwrap();
        assert!(location.starts_with(&state.config.gateway.front_ok));
        assert!(location.contains("oid=ORDER1234567890ABCDE"));

        let mut conn = pool.acquire().await.unwrap();
        let attempt = PaymentAttempts::new(&mut conn)
            .get_by_oid("ORDER1234567890ABCDE")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attempt.status, PaymentStatus::Ok);

        let paid = Bookings::new(&mut conn).get_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(paid.status, BookingStatus::Paid);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_oid_still_redirects(pool: PgPool) {
        let (app, _) = create_test_app(pool.clone()).await;

        let response = app.get("/api/ok").add_query_param("oid", "NO-SUCH-ORDER").await;

        response.assert_status(StatusCode::FOUND);
        assert!(response.header("location").to_str().unwrap().contains("oid=NO-SUCH-ORDER"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_failure_callback_keeps_booking_pending(pool: PgPool) {
        let (app, state) = create_test_app(pool.clone()).await;
        seed_test_villa(&pool, "vip-1", "VIP 1", "VIP").await;
        let booking = seed_test_booking(&pool, "vip-1", "2025-11-01", "2025-11-05", BookingStatus::Pending).await;
        seed_attempt(&pool, "ORDERFAILFAILFAIL123", json!({ "bookingId": booking.id })).await;

        let response = app
            .post("/api/fail")
            .form(&[("OrderId", "ORDERFAILFAILFAIL123"), ("ErrMsg", "Card declined")])
            .await;

        response.assert_status(StatusCode::FOUND);
        let location = response.header("location");
        let location = location.to_str().unwrap();
        assert!(location.starts_with(&state.config.gateway.front_fail));
        assert!(location.contains("oid=ORDERFAILFAILFAIL123"));
        assert!(location.contains("msg=Card"));

        let mut conn = pool.acquire().await.unwrap();
        let attempt = PaymentAttempts::new(&mut conn)
            .get_by_oid("ORDERFAILFAILFAIL123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attempt.status, PaymentStatus::Fail);

        let still_pending = Bookings::new(&mut conn).get_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(still_pending.status, BookingStatus::Pending);
    }

    #[test]
    fn test_append_query_handles_existing_query_string() {
        let target = super::append_query("https://example.com/done?lang=en", &[("oid", "ABC")]);
        assert_eq!(target, "https://example.com/done?lang=en&oid=ABC");

        let target = super::append_query("https://example.com/done", &[("oid", "ABC"), ("msg", "Card declined")]);
        assert_eq!(target, "https://example.com/done?oid=ABC&msg=Card+declined");
    }
}
