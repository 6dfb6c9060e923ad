//! Repository access for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` — unified access to all per-aggregate repositories
//! - `RecordScope` — which rows a role-scoped listing may return
//! - `DomainResult` — standard result type for domain operations

use super::booking::BookingRepository;
use super::notification::NotificationRepository;
use super::review::ReviewRepository;
use super::session::SessionRepository;
use super::station::StationRepository;
use super::transaction::TransactionRepository;
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Restricts a listing to the records a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordScope {
    All,
    /// Records owned by one user
    User(String),
    /// Records at any of these stations
    Stations(Vec<String>),
    /// Records linked to any of these sessions
    Sessions(Vec<String>),
}

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let station = repos.stations().find_by_id("st-1").await?;
///     let active = repos.sessions().find_active_for_user("u-1").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn stations(&self) -> &dyn StationRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn transactions(&self) -> &dyn TransactionRepository;
    fn notifications(&self) -> &dyn NotificationRepository;
    fn reviews(&self) -> &dyn ReviewRepository;
}
