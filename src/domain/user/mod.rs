//! User aggregate
//!
//! Accounts for drivers, station operators and administrators.

pub mod model;
pub mod repository;

pub use model::{Actor, ProfileUpdate, User, UserRole};
pub use repository::UserRepository;
