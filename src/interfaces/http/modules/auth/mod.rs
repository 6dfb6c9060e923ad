//! Authentication module: login, registration, profile and password change

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
