//! Database entities module

pub mod booking;
pub mod charging_session;
pub mod notification;
pub mod review;
pub mod station;
pub mod station_port;
pub mod transaction;
pub mod user;

pub use booking::Entity as Booking;
pub use charging_session::Entity as ChargingSession;
pub use notification::Entity as Notification;
pub use review::Entity as Review;
pub use station::Entity as Station;
pub use station_port::Entity as StationPort;
pub use transaction::Entity as Transaction;
pub use user::Entity as User;
