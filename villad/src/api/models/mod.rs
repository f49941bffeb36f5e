//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Wire Format**: the public API keeps the camelCase field names the site's
//!   frontend already speaks (`villaSlug`, `checkIn`, `conflictingBookings`);
//!   the channel webhook keeps its partner's snake_case payload
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! - [`villas`]: Villa catalog entries and admin CRUD requests
//! - [`bookings`]: Reservations, admin edits, bulk operations, statistics
//! - [`availability`]: Overlap-check requests and availability listings
//! - [`payments`]: Payment initiation requests and hosted-form responses
//! - [`channels`]: Channel sync, webhook and sync-log payloads
//! - [`contact`]: Contact form submissions
//! - [`users`]: Admin-panel user management and statistics
//! - [`auth`]: Login payloads and session tokens

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod channels;
pub mod contact;
pub mod payments;
pub mod users;
pub mod villas;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic acknowledgement returned by delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn new() -> Self {
        Self { success: true }
    }
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self::new()
    }
}
