use std::sync::Arc;

use tracing::debug;

use crate::application::access::ensure_self_or_admin;
use crate::domain::{Actor, DomainError, DomainResult, Notification, RepositoryProvider};

pub struct NotificationService {
    repos: Arc<dyn RepositoryProvider>,
}

impl NotificationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn list(&self, actor: &Actor, user_id: &str) -> DomainResult<Vec<Notification>> {
        ensure_self_or_admin(actor, user_id)?;
        self.repos.notifications().list_for_user(user_id).await
    }

    /// Someone else's notification is reported as missing.
    pub async fn mark_read(&self, actor: &Actor, id: &str) -> DomainResult<()> {
        let found = self.repos.notifications().find_by_id(id).await?;
        match found {
            Some(n) if actor.can_act_for(&n.user_id) => {
                if !n.read {
                    self.repos.notifications().mark_read(id).await?;
                }
                debug!(notification_id = id, "Notification read");
                Ok(())
            }
            _ => Err(DomainError::not_found("Notification", id)),
        }
    }

    pub async fn mark_all_read(&self, actor: &Actor, user_id: &str) -> DomainResult<u64> {
        ensure_self_or_admin(actor, user_id)?;
        self.repos.notifications().mark_all_read(user_id).await
    }

    pub async fn delete(&self, actor: &Actor, id: &str) -> DomainResult<()> {
        let n = self
            .repos
            .notifications()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", id))?;
        if !actor.can_act_for(&n.user_id) {
            return Err(DomainError::forbidden());
        }
        self.repos.notifications().delete(id).await
    }

    pub async fn unread_count(&self, actor: &Actor, user_id: &str) -> DomainResult<u64> {
        ensure_self_or_admin(actor, user_id)?;
        self.repos.notifications().count_unread(user_id).await
    }
}
