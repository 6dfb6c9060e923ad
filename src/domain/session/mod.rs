//! Charging session aggregate

pub mod model;
pub mod repository;

pub use model::{ChargingSession, SessionOptions, SessionStatus, ALREADY_CHARGING, NOT_ACTIVE};
pub use repository::SessionRepository;
