//! Station reviews

pub mod model;
pub mod repository;

pub use model::{average_rating, is_valid_rating, Review, ALREADY_REVIEWED};
pub use repository::{ReviewFilter, ReviewRepository};
