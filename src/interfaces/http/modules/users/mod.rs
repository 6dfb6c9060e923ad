//! User directory: search, profile lookups and self-service updates

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
