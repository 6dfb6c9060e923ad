//! Identity module: accounts and authentication
//!
//! `UserService` covers login, registration, profile and password changes,
//! account lookups and admin status changes. `seed` creates the demo
//! accounts on an empty database.

pub mod seed;
pub mod service;

pub use seed::{seed_default_users, DEFAULT_ACCOUNTS};
pub use service::{AuthResult, Registration, UserService};
