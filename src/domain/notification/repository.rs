use async_trait::async_trait;

use super::model::Notification;
use crate::domain::DomainResult;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Notification>>;

    /// Newest first.
    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<Notification>>;

    async fn mark_read(&self, id: &str) -> DomainResult<()>;

    /// Returns the number of notifications that changed.
    async fn mark_all_read(&self, user_id: &str) -> DomainResult<u64>;

    async fn delete(&self, id: &str) -> DomainResult<()>;

    async fn count_unread(&self, user_id: &str) -> DomainResult<u64>;
}
