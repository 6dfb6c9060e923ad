//! SeaORM implementation of TransactionRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::debug;

use super::db_err;
use crate::domain::transaction::{
    Transaction, TransactionRepository, TransactionStatus, TransactionType,
};
use crate::domain::{DomainResult, RecordScope};
use crate::infrastructure::database::entities::transaction;

pub struct SeaOrmTransactionRepository {
    db: DatabaseConnection,
}

impl SeaOrmTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: transaction::Model) -> Transaction {
    Transaction {
        id: m.id,
        user_id: m.user_id,
        session_id: m.session_id,
        amount: m.amount,
        transaction_type: TransactionType::from_str(&m.transaction_type),
        status: TransactionStatus::from_str(&m.status),
        payment_method: m.payment_method,
        description: m.description,
        card_last4: m.card_last4,
        timestamp: m.timestamp,
        created_at: m.created_at,
    }
}

pub(crate) fn transaction_to_active(t: &Transaction) -> transaction::ActiveModel {
    transaction::ActiveModel {
        id: Set(t.id.clone()),
        user_id: Set(t.user_id.clone()),
        session_id: Set(t.session_id.clone()),
        amount: Set(t.amount),
        transaction_type: Set(t.transaction_type.as_str().to_string()),
        status: Set(t.status.as_str().to_string()),
        payment_method: Set(t.payment_method.clone()),
        description: Set(t.description.clone()),
        card_last4: Set(t.card_last4.clone()),
        timestamp: Set(t.timestamp),
        created_at: Set(t.created_at),
    }
}

// ── TransactionRepository impl ──────────────────────────────────

#[async_trait]
impl TransactionRepository for SeaOrmTransactionRepository {
    async fn create(&self, t: &Transaction) -> DomainResult<()> {
        debug!(
            transaction_id = %t.id,
            kind = t.transaction_type.as_str(),
            amount = t.amount,
            "Recording transaction"
        );
        transaction_to_active(t)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list(&self, scope: &RecordScope) -> DomainResult<Vec<Transaction>> {
        let query = match scope {
            RecordScope::All => transaction::Entity::find(),
            RecordScope::User(user_id) => transaction::Entity::find()
                .filter(transaction::Column::UserId.eq(user_id.as_str())),
            RecordScope::Sessions(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                transaction::Entity::find()
                    .filter(transaction::Column::SessionId.is_in(ids.iter().cloned()))
            }
            // Transactions reach stations only through their session
            RecordScope::Stations(_) => return Ok(Vec::new()),
        };
        let models = query
            .order_by_desc(transaction::Column::Timestamp)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<Transaction>> {
        self.list(&RecordScope::User(user_id.to_string())).await
    }

    async fn list_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> DomainResult<Vec<Transaction>> {
        let models = transaction::Entity::find()
            .filter(transaction::Column::TransactionType.eq(transaction_type.as_str()))
            .order_by_desc(transaction::Column::Timestamp)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_charges_for_session(&self, session_id: &str) -> DomainResult<Vec<Transaction>> {
        let models = transaction::Entity::find()
            .filter(transaction::Column::SessionId.eq(session_id))
            .filter(transaction::Column::TransactionType.eq(TransactionType::Charging.as_str()))
            .order_by_asc(transaction::Column::Timestamp)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update_amount(&self, id: &str, amount: f64) -> DomainResult<()> {
        transaction::Entity::update_many()
            .col_expr(transaction::Column::Amount, Expr::value(amount))
            .filter(transaction::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn latest(&self, limit: u64) -> DomainResult<Vec<Transaction>> {
        let models = transaction::Entity::find()
            .order_by_desc(transaction::Column::Timestamp)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::wallet_balance;
    use crate::domain::user::UserRole;
    use crate::infrastructure::database::testing::{create_user, test_repos};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn ledger_is_listed_newest_first_and_feeds_the_balance() {
        let repos = test_repos().await;
        let u = create_user(repos.as_ref(), "u@x.io", UserRole::User).await;

        let mut topup = Transaction::completed(
            &u.id,
            40.0,
            TransactionType::WalletTopup,
            "Card",
            "Wallet Top-up",
        );
        topup.timestamp = Utc::now() - Duration::minutes(5);
        let spend = Transaction::completed(
            &u.id,
            12.5,
            TransactionType::Charging,
            "Wallet",
            "Charging session at station",
        );
        repos.transactions().create(&topup).await.unwrap();
        repos.transactions().create(&spend).await.unwrap();

        let txs = repos.transactions().list_for_user(&u.id).await.unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].id, spend.id);
        assert_eq!(wallet_balance(&txs), 27.5);

        let topups = repos
            .transactions()
            .list_by_type(TransactionType::WalletTopup)
            .await
            .unwrap();
        assert_eq!(topups.len(), 1);
    }

    #[tokio::test]
    async fn update_amount() {
        let repos = test_repos().await;
        let u = create_user(repos.as_ref(), "u@x.io", UserRole::User).await;
        let t = Transaction::completed(&u.id, 0.0, TransactionType::Charging, "Card", "x");
        repos.transactions().create(&t).await.unwrap();

        repos.transactions().update_amount(&t.id, 9.99).await.unwrap();
        let latest = repos.transactions().latest(1).await.unwrap();
        assert_eq!(latest[0].amount, 9.99);
    }
}
