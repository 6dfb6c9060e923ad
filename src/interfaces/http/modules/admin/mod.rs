//! Admin dashboard and platform management. Every route requires the admin role.

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
