//! Charging session repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::ChargingSession;
use crate::domain::notification::Notification;
use crate::domain::transaction::Transaction;
use crate::domain::{DomainResult, RecordScope};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert an active session and mark its port busy, atomically.
    /// Fails with `DomainError::Conflict` when the user already has an
    /// active session.
    async fn start(&self, session: &ChargingSession) -> DomainResult<()>;

    /// Persist a completed session, release its port, record the charge and
    /// notify the driver, all in one database transaction.
    async fn complete(
        &self,
        session: &ChargingSession,
        charge: &Transaction,
        notification: &Notification,
    ) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ChargingSession>>;

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<ChargingSession>>;

    async fn find_active_for_user(&self, user_id: &str) -> DomainResult<Option<ChargingSession>>;

    /// Newest start time first.
    async fn list(&self, scope: &RecordScope) -> DomainResult<Vec<ChargingSession>>;

    /// Completed sessions of one user, newest first.
    async fn list_completed_for_user(&self, user_id: &str) -> DomainResult<Vec<ChargingSession>>;

    /// All completed sessions, oldest first.
    async fn list_completed(&self) -> DomainResult<Vec<ChargingSession>>;

    /// Sessions at `station_ids` that started at or after `since`.
    async fn list_started_since(
        &self,
        station_ids: &[String],
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<ChargingSession>>;

    async fn count_active_at(&self, station_ids: &[String]) -> DomainResult<u64>;

    /// Ids of every session held at `station_ids`.
    async fn ids_at_stations(&self, station_ids: &[String]) -> DomainResult<Vec<String>>;

    /// Overwrite the billing figures of a finished session.
    async fn update_billing(&self, session: &ChargingSession) -> DomainResult<()>;
}
