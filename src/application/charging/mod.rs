//! Charging sessions
//!
//! `SessionService` starts, stops and reports on sessions. `repair`
//! reconciles billing of finished sessions with the transaction ledger.

pub mod repair;
pub mod service;

pub use repair::{repair_charging, RepairReport};
pub use service::{SessionService, SessionStats, SessionView, StartSession};
