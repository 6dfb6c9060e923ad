//! Operator console. Routes require the operator or admin role and only
//! cover the caller's own stations.

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
