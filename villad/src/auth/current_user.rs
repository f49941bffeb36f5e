//! Axum extractors for the authenticated panel user.
//!
//! Panel endpoints authenticate with a Bearer JWT issued by the login
//! endpoint. [`CurrentUser`] rejects requests without a valid token;
//! [`AdminUser`] additionally requires the admin role.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Pull the Bearer token out of the Authorization header, if any.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts).ok_or(Error::Unauthenticated {
            message: Some("Missing token".to_string()),
        })?;

        match session::verify_session_token(token, &state.config) {
            Ok(user) => Ok(user),
            Err(Error::Unauthenticated { .. }) => {
                trace!("session token rejected");
                Err(Error::Unauthenticated {
                    message: Some("Invalid token".to_string()),
                })
            }
            // Key/config problems stay internal errors rather than 401s
            Err(e) => Err(e),
        }
    }
}

/// Extractor wrapper that additionally requires the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(Error::InsufficientPermissions);
        }
        Ok(AdminUser(user))
    }
}
