//! Booking aggregate

pub mod model;
pub mod repository;

pub use model::{
    is_valid_booking_date, is_valid_time_slot, Booking, BookingStatus, SLOT_TAKEN, TIME_SLOTS,
};
pub use repository::BookingRepository;
