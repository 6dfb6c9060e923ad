//! Booking repository interface

use async_trait::async_trait;

use super::model::{Booking, BookingStatus};
use crate::domain::{DomainResult, RecordScope};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking. Fails with `DomainError::Conflict` when another
    /// confirmed or pending booking already holds the same slot.
    async fn create(&self, booking: &Booking) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>>;

    /// Newest first.
    async fn list(&self, scope: &RecordScope) -> DomainResult<Vec<Booking>>;

    /// The booking currently holding a slot, if any.
    async fn find_holding(
        &self,
        station_id: &str,
        port_id: i32,
        date: &str,
        time_slot: &str,
    ) -> DomainResult<Option<Booking>>;

    /// Time slots held on `date`, optionally for one port only.
    async fn held_slots(
        &self,
        station_id: &str,
        date: &str,
        port_id: Option<i32>,
    ) -> DomainResult<Vec<String>>;

    async fn set_status(&self, id: &str, status: BookingStatus) -> DomainResult<()>;
}
