//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//! - **Type Safety**: Uses type aliases for IDs (UserId, VillaId, etc.)
//!
//! # Model Categories
//!
//! ## Core Resources
//!
//! - [`users`]: Panel user accounts and credentials
//! - [`villas`]: The rentable property catalog
//! - [`bookings`]: Guest reservations, from any source
//!
//! ## Payments and Channels
//!
//! - [`payment_attempts`]: Hosted-payment-page orders and their outcomes
//! - [`availability_overrides`]: Per-day calendar blocks synced from channels
//! - [`sync_logs`]: Audit trail of channel synchronization events
//!
//! # Conversion to API Models
//!
//! Database models typically implement `From` or `Into` conversions to API models:
//!
//! ```ignore
//! use villad::db::models::villas::VillaDBResponse;
//! use villad::api::models::villas::VillaResponse;
//!
//! let db_villa: VillaDBResponse = /* ... */;
//! let api_response: VillaResponse = db_villa.into();
//! ```

pub mod availability_overrides;
pub mod bookings;
pub mod payment_attempts;
pub mod sync_logs;
pub mod users;
pub mod villas;
