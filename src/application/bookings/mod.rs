//! Slot bookings

pub mod service;

pub use service::{BookingService, BookingView, NewBooking};
