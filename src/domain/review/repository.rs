use async_trait::async_trait;

use super::model::Review;
use crate::domain::DomainResult;

/// Optional filters for review listings.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub rating: Option<i32>,
    pub station_id: Option<String>,
    pub user_id: Option<String>,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review. A second review of the same station by the same user
    /// yields `DomainError::Conflict`.
    async fn create(&self, review: &Review) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Review>>;

    /// Newest first, optionally capped at `limit`.
    async fn list(&self, filter: &ReviewFilter, limit: Option<u64>) -> DomainResult<Vec<Review>>;

    /// Every rating given to one station.
    async fn ratings_for_station(&self, station_id: &str) -> DomainResult<Vec<i32>>;

    /// Returns `false` when the review does not exist.
    async fn increment_helpful(&self, id: &str) -> DomainResult<bool>;
}
