//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: Panel user accounts and authentication
//! - [`Villas`]: Villa catalog management
//! - [`Bookings`]: Reservations, overlap counting, stats, and bulk operations
//! - [`PaymentAttempts`]: Payment order lifecycle, keyed by gateway oid
//! - [`AvailabilityOverrides`]: Per-day channel blocks
//! - [`SyncLogs`]: Channel synchronization audit trail
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use villad::db::handlers::{Repository, Villas};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     // Start a transaction
//!     let mut tx = pool.begin().await?;
//!
//!     // Create repository from transaction
//!     let mut repo = Villas::new(&mut tx);
//!
//!     // Perform operations
//!     let villas = repo.list(&Default::default()).await?;
//!
//!     // Commit or rollback
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod availability_overrides;
pub mod bookings;
pub mod payment_attempts;
pub mod repository;
pub mod sync_logs;
pub mod users;
pub mod villas;

pub use availability_overrides::AvailabilityOverrides;
pub use bookings::Bookings;
pub use payment_attempts::PaymentAttempts;
pub use repository::Repository;
pub use sync_logs::SyncLogs;
pub use users::Users;
pub use villas::Villas;
