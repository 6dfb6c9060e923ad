//! Route handlers and DTOs, one module per resource

pub mod admin;
pub mod ai;
pub mod auth;
pub mod bookings;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod operator;
pub mod request_id;
pub mod reviews;
pub mod sessions;
pub mod stations;
pub mod transactions;
pub mod users;
