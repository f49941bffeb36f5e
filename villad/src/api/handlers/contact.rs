use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::contact::{ContactRequest, ContactResponse},
};

use super::form_error;

/// Submit the public contact form
///
/// Relays the message to the site admin inbox with the sender set as
/// reply-to. The frontend shows `error` verbatim, so validation messages
/// here are guest-facing.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message relayed to the admin inbox", body = ContactResponse),
        (status = 400, description = "Missing fields or invalid email"),
        (status = 500, description = "Email delivery failed"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_contact(State(state): State<AppState>, Json(request): Json<ContactRequest>) -> Response {
    let (Some(first_name), Some(last_name), Some(email), Some(message)) = (
        request.first_name.filter(|value| !value.is_empty()),
        request.last_name.filter(|value| !value.is_empty()),
        request.email.filter(|value| !value.is_empty()),
        request.message.filter(|value| !value.is_empty()),
    ) else {
        return form_error(StatusCode::BAD_REQUEST, "All required fields must be filled in");
    };

    if !is_valid_email(&email) {
        return form_error(StatusCode::BAD_REQUEST, "Email address is not valid");
    }

    let subject = request.subject.as_deref().filter(|value| !value.is_empty());
    match state
        .email
        .send_contact_email(&first_name, &last_name, &email, subject, &message)
        .await
    {
        Ok(()) => Json(ContactResponse {
            ok: true,
            message: "Your message was sent successfully! We will get back to you as soon as possible.".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("contact email delivery failed: {e:#}");
            form_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred. Please try again or contact us directly.",
            )
        }
    }
}

/// Mirrors the frontend check: something before the `@`, a domain with at
/// least one dot, a non-empty label after the final dot, and no whitespace
/// or second `@` anywhere.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;
    use crate::test_utils::*;
    use serde_json::json;
    use sqlx::PgPool;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("guest@example.com"));
        assert!(is_valid_email("first.last@mail.example.co"));

        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("guest@example"));
        assert!(!is_valid_email("guest@.com"));
        assert!(!is_valid_email("guest@example."));
        assert!(!is_valid_email("gu est@example.com"));
        assert!(!is_valid_email("guest@@example.com"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_contact_requires_all_fields(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;

        let response = app
            .post("/api/contact")
            .json(&json!({ "firstName": "Arta", "email": "arta@example.com", "message": "Hello" }))
            .await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "All required fields must be filled in");

        // Empty strings count as missing
        let response = app
            .post("/api/contact")
            .json(&json!({
                "firstName": "Arta",
                "lastName": "",
                "email": "arta@example.com",
                "message": "Hello"
            }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<serde_json::Value>()["error"], "All required fields must be filled in");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_contact_rejects_malformed_email(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;

        let response = app
            .post("/api/contact")
            .json(&json!({
                "firstName": "Arta",
                "lastName": "Krasniqi",
                "email": "not-an-email",
                "message": "Hello"
            }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Email address is not valid");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_contact_sends_and_confirms(pool: PgPool) {
        let (app, _) = create_test_app(pool).await;

        let response = app
            .post("/api/contact")
            .json(&json!({
                "firstName": "Arta",
                "lastName": "Krasniqi",
                "email": "arta@example.com",
                "subject": "Availability in July",
                "message": "Is the VIP villa free the first week of July?"
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(
            body["message"],
            "Your message was sent successfully! We will get back to you as soon as possible."
        );
    }
}
