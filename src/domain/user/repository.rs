//! User repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{User, UserRole};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A duplicate email yields `DomainError::Conflict`.
    async fn create(&self, user: User) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Batch lookup used to attach display names to listings.
    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<User>>;

    /// All users, optionally restricted to one role.
    async fn list(&self, role: Option<UserRole>) -> DomainResult<Vec<User>>;

    /// Case-insensitive substring search on name and email.
    async fn search(&self, query: &str, role: Option<UserRole>) -> DomainResult<Vec<User>>;

    /// Persist profile fields of an existing user.
    async fn update(&self, user: &User) -> DomainResult<()>;

    async fn update_password(&self, id: &str, password_hash: &str) -> DomainResult<()>;

    /// Returns `false` when no user has this id.
    async fn set_active(&self, id: &str, active: bool) -> DomainResult<bool>;

    async fn count(&self) -> DomainResult<u64>;

    async fn count_by_role(&self, role: UserRole) -> DomainResult<u64>;

    /// Users created in `[from, to)`.
    async fn count_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<u64>;

    /// Most recently created users first.
    async fn latest(&self, limit: u64) -> DomainResult<Vec<User>>;
}
