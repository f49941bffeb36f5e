//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Admin panel login
//! - [`availability`]: Public availability check and available-villas listing
//! - [`bookings`]: Guest reservations plus admin booking management
//! - [`channels`]: Channel sync, inbound webhook bookings, and sync logs
//! - [`contact`]: Contact form delivery
//! - [`payments`]: Hosted payment page initiation and bank callbacks
//! - [`users`]: Admin user management
//! - [`villas`]: Public villa catalog plus admin villa management
//!
//! # Authentication
//!
//! Admin handlers require a bearer token; the [`crate::auth`] module provides
//! the `CurrentUser` and `AdminUser` extractors they use.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and JSON error responses. The public
//! form-style endpoints instead answer invalid submissions inline with the
//! `{ "ok": false, "error": ... }` body shape their clients expect.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod channels;
pub mod contact;
pub mod payments;
pub mod users;
pub mod villas;

/// Rejection body for the public form-style endpoints.
pub(crate) fn form_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "ok": false, "error": message }))).into_response()
}
