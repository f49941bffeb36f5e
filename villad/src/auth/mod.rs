//! Authentication and authorization for the admin panel.
//!
//! Panel users log in with email and password at `/api/admin/login` and
//! receive a signed JWT. Every other `/api/admin` route requires that token
//! in an `Authorization: Bearer <token>` header.
//!
//! Only users holding the admin role are ever issued tokens; staff accounts
//! exist in the database but cannot sign in. The role travels inside the
//! token claims, so a demotion takes effect once outstanding tokens expire.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use villad::auth::current_user::AdminUser;
//!
//! async fn protected_handler(AdminUser(user): AdminUser) -> String {
//!     format!("Hello, {}!", user.name)
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod session;
