//! Transaction repository interface

use async_trait::async_trait;

use super::model::{Transaction, TransactionType};
use crate::domain::{DomainResult, RecordScope};

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create(&self, transaction: &Transaction) -> DomainResult<()>;

    /// Newest first.
    async fn list(&self, scope: &RecordScope) -> DomainResult<Vec<Transaction>>;

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<Transaction>>;

    async fn list_by_type(&self, transaction_type: TransactionType)
        -> DomainResult<Vec<Transaction>>;

    /// Charging transactions recorded against one session.
    async fn list_charges_for_session(&self, session_id: &str) -> DomainResult<Vec<Transaction>>;

    async fn update_amount(&self, id: &str, amount: f64) -> DomainResult<()>;

    async fn latest(&self, limit: u64) -> DomainResult<Vec<Transaction>>;
}
