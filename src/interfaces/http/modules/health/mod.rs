//! Liveness, database status and diagnostics (public)

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
