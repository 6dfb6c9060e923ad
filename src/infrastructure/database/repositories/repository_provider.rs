//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::notification::NotificationRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::review::ReviewRepository;
use crate::domain::session::SessionRepository;
use crate::domain::station::StationRepository;
use crate::domain::transaction::TransactionRepository;
use crate::domain::user::UserRepository;

use super::booking_repository::SeaOrmBookingRepository;
use super::notification_repository::SeaOrmNotificationRepository;
use super::review_repository::SeaOrmReviewRepository;
use super::session_repository::SeaOrmSessionRepository;
use super::station_repository::SeaOrmStationRepository;
use super::transaction_repository::SeaOrmTransactionRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let station = repos.stations().find_by_id("st-1").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    stations: SeaOrmStationRepository,
    bookings: SeaOrmBookingRepository,
    sessions: SeaOrmSessionRepository,
    transactions: SeaOrmTransactionRepository,
    notifications: SeaOrmNotificationRepository,
    reviews: SeaOrmReviewRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            stations: SeaOrmStationRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone()),
            sessions: SeaOrmSessionRepository::new(db.clone()),
            transactions: SeaOrmTransactionRepository::new(db.clone()),
            notifications: SeaOrmNotificationRepository::new(db.clone()),
            reviews: SeaOrmReviewRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn stations(&self) -> &dyn StationRepository {
        &self.stations
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        &self.transactions
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.notifications
    }

    fn reviews(&self) -> &dyn ReviewRepository {
        &self.reviews
    }
}
