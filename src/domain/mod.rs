//! Domain layer: entities, business rules and repository interfaces

pub mod booking;
pub mod notification;
pub mod pricing;
pub mod repositories;
pub mod review;
pub mod session;
pub mod station;
pub mod transaction;
pub mod user;

pub use booking::{Booking, BookingRepository, BookingStatus};
pub use notification::{Notification, NotificationRepository};
pub use repositories::{DomainResult, RecordScope, RepositoryProvider};
pub use review::{Review, ReviewFilter, ReviewRepository};
pub use session::{ChargingSession, SessionRepository, SessionStatus};
pub use station::{Port, PortStatus, Station, StationRepository, StationStatus};
pub use transaction::{Transaction, TransactionRepository, TransactionStatus, TransactionType};
pub use user::{Actor, User, UserRepository, UserRole};

pub use crate::shared::errors::DomainError;
