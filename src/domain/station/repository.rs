//! Station repository interface

use async_trait::async_trait;
use serde_json::Value;

use super::model::{PortStatus, Station, StationStatus};
use crate::domain::DomainResult;

/// Filters that can be pushed down to storage. Distance and charging-type
/// filtering happen in the service.
#[derive(Debug, Clone, Default)]
pub struct StationFilter {
    pub status: Option<StationStatus>,
    /// Case-insensitive substring of the city
    pub city: Option<String>,
}

#[async_trait]
pub trait StationRepository: Send + Sync {
    /// Insert a station together with its ports.
    async fn create(&self, station: &Station) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Station>>;

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<Station>>;

    async fn list(&self, filter: &StationFilter) -> DomainResult<Vec<Station>>;

    async fn find_by_operator(&self, operator_id: &str) -> DomainResult<Vec<Station>>;

    /// Replace all station fields and its port list.
    async fn update(&self, station: &Station) -> DomainResult<()>;

    /// Returns `false` when the station does not exist.
    async fn set_status(&self, id: &str, status: StationStatus) -> DomainResult<bool>;

    /// Returns `false` when the station or port does not exist.
    async fn set_port_status(
        &self,
        station_id: &str,
        port_id: i32,
        status: PortStatus,
    ) -> DomainResult<bool>;

    async fn update_pricing(
        &self,
        id: &str,
        pricing: Value,
        peak_hours: Option<String>,
    ) -> DomainResult<bool>;

    async fn update_rating(&self, id: &str, rating: f64, total_reviews: i32) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;

    /// Ports across all stations whose status is not `offline`.
    async fn count_active_ports(&self) -> DomainResult<u64>;

    /// `(city, station count)` ordered by count descending.
    async fn count_by_city(&self, limit: u64) -> DomainResult<Vec<(String, u64)>>;

    async fn latest(&self, limit: u64) -> DomainResult<Vec<Station>>;

    async fn top_rated(&self, limit: u64) -> DomainResult<Vec<Station>>;

    /// Stations rated strictly below `threshold`, lowest first.
    async fn rated_below(&self, threshold: f64, limit: u64) -> DomainResult<Vec<Station>>;
}
