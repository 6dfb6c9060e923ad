//! Payments and the derived wallet balance

pub mod service;

pub use service::{PaymentRequest, PaymentService, PaymentSummary, Topup, TopupResult};
