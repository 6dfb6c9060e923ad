//! Station reviews and ratings

pub mod service;

pub use service::{NewReview, ReviewService, ReviewView};
