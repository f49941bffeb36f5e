//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! The API is divided into several functional areas:
//!
//! - **Public catalog** (`/api/villas`, `/api/check-availability`,
//!   `/api/available-villas`): villa listing and date availability
//! - **Reservations** (`/api/bookings`): guest booking submission and listing
//! - **Payments** (`/api/init`, `/api/ok`, `/api/fail`): hosted payment page
//!   initiation and bank callbacks
//! - **Contact** (`/api/contact`): contact form delivery to the admin inbox
//! - **Channels** (`/api/channels/*`): availability sync with external sales
//!   channels, inbound webhook bookings, and the sync log
//! - **Admin panel** (`/api/admin/*`): login plus villa, booking, and user
//!   management, guarded by a bearer token with the admin role
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! The API reference UI is served at `/scalar` when the server is running.

pub mod handlers;
pub mod models;
