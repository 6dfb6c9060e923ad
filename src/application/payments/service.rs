use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::application::access::{ensure_self_or_admin, operator_station_ids};
use crate::domain::transaction::{wallet_balance, DEFAULT_CARD_METHOD, TOPUP_DESCRIPTION};
use crate::domain::{
    Actor, DomainError, DomainResult, RecordScope, RepositoryProvider, Transaction,
    TransactionType, UserRole,
};
use crate::shared::round_money;

const DEFAULT_PAYMENT_DESCRIPTION: &str = "Payment";

#[derive(Debug, Clone, Default)]
pub struct PaymentRequest {
    pub amount: Option<f64>,
    pub session_id: Option<String>,
    pub transaction_type: Option<String>,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub card_last4: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Topup {
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub card_last4: Option<String>,
}

impl Topup {
    pub fn of(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopupResult {
    pub new_balance: f64,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary {
    pub total_charging: f64,
    pub total_topup: f64,
    pub transaction_count: u64,
    /// `YYYY-MM` -> charging spend
    pub monthly_spending: BTreeMap<String, f64>,
}

impl PaymentSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut total_charging = 0.0;
        let mut total_topup = 0.0;
        let mut monthly_spending: BTreeMap<String, f64> = BTreeMap::new();

        for tx in transactions {
            match tx.transaction_type {
                TransactionType::Charging => {
                    total_charging += tx.amount;
                    *monthly_spending
                        .entry(tx.timestamp.format("%Y-%m").to_string())
                        .or_default() += tx.amount;
                }
                TransactionType::WalletTopup => total_topup += tx.amount,
                TransactionType::Refund => {}
            }
        }
        for amount in monthly_spending.values_mut() {
            *amount = round_money(*amount);
        }

        Self {
            total_charging: round_money(total_charging),
            total_topup: round_money(total_topup),
            transaction_count: transactions.len() as u64,
            monthly_spending,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct PaymentService {
    repos: Arc<dyn RepositoryProvider>,
}

impl PaymentService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Drivers see their own payments, operators those tied to sessions at
    /// their stations, admins everything. Newest first.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<Transaction>> {
        let scope = match actor.role {
            UserRole::Admin => RecordScope::All,
            UserRole::User => RecordScope::User(actor.user_id.clone()),
            UserRole::Operator => {
                let stations = operator_station_ids(self.repos.as_ref(), &actor.user_id).await?;
                RecordScope::Sessions(self.repos.sessions().ids_at_stations(&stations).await?)
            }
        };
        self.repos.transactions().list(&scope).await
    }

    pub async fn process(&self, actor: &Actor, req: PaymentRequest) -> DomainResult<Transaction> {
        let amount = req.amount.filter(|a| a.is_finite() && *a > 0.0).ok_or_else(|| {
            DomainError::Validation("amount must be greater than 0".into())
        })?;

        let session_id = non_empty(req.session_id);
        if let Some(id) = &session_id {
            if self.repos.sessions().find_by_id(id).await?.is_none() {
                return Err(DomainError::Validation("Invalid sessionId".into()));
            }
        }

        let transaction_type = match non_empty(req.transaction_type) {
            None => TransactionType::Charging,
            Some(t) => TransactionType::parse(&t)
                .ok_or_else(|| DomainError::Validation("Invalid transaction type".into()))?,
        };

        let mut tx = Transaction::completed(
            &actor.user_id,
            round_money(amount),
            transaction_type,
            non_empty(req.payment_method).unwrap_or_else(|| DEFAULT_CARD_METHOD.to_string()),
            non_empty(req.description).unwrap_or_else(|| DEFAULT_PAYMENT_DESCRIPTION.to_string()),
        );
        tx.session_id = session_id;
        tx.card_last4 = non_empty(req.card_last4);

        self.repos.transactions().create(&tx).await?;
        info!(
            transaction_id = %tx.id,
            user_id = %actor.user_id,
            amount = tx.amount,
            kind = tx.transaction_type.as_str(),
            "Payment recorded"
        );
        Ok(tx)
    }

    /// Never negative.
    pub async fn balance(&self, actor: &Actor, user_id: &str) -> DomainResult<f64> {
        ensure_self_or_admin(actor, user_id)?;
        self.current_balance(user_id).await
    }

    async fn current_balance(&self, user_id: &str) -> DomainResult<f64> {
        let txs = self.repos.transactions().list_for_user(user_id).await?;
        Ok(wallet_balance(&txs).max(0.0))
    }

    pub async fn topup(&self, actor: &Actor, req: Topup) -> DomainResult<TopupResult> {
        let amount = req
            .amount
            .filter(|a| a.is_finite() && *a > 0.0)
            .ok_or_else(|| DomainError::Validation("Amount must be positive".into()))?;

        let mut tx = Transaction::completed(
            &actor.user_id,
            round_money(amount),
            TransactionType::WalletTopup,
            non_empty(req.payment_method).unwrap_or_else(|| DEFAULT_CARD_METHOD.to_string()),
            TOPUP_DESCRIPTION,
        );
        tx.card_last4 = non_empty(req.card_last4);
        self.repos.transactions().create(&tx).await?;

        let new_balance = self.current_balance(&actor.user_id).await?;
        info!(user_id = %actor.user_id, amount = tx.amount, new_balance, "Wallet topped up");
        Ok(TopupResult {
            new_balance,
            transaction_id: tx.id,
        })
    }

    pub async fn summary(&self, actor: &Actor, user_id: &str) -> DomainResult<PaymentSummary> {
        ensure_self_or_admin(actor, user_id)?;
        let txs = self.repos.transactions().list_for_user(user_id).await?;
        Ok(PaymentSummary::from_transactions(&txs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::charging::{SessionService, StartSession};
    use crate::infrastructure::database::testing::{create_station, create_user, test_repos};
    use chrono::{TimeZone, Utc};

    async fn setup() -> (PaymentService, Arc<dyn RepositoryProvider>, Actor) {
        let repos = test_repos().await;
        let driver = create_user(repos.as_ref(), "d@example.com", UserRole::User).await;
        (
            PaymentService::new(repos.clone()),
            repos,
            Actor::new(driver.id, UserRole::User),
        )
    }

    #[tokio::test]
    async fn topups_raise_the_balance() {
        let (svc, _, driver) = setup().await;
        assert_eq!(svc.balance(&driver, &driver.user_id).await.unwrap(), 0.0);

        let first = svc.topup(&driver, Topup::of(50.0)).await.unwrap();
        assert_eq!(first.new_balance, 50.0);
        let second = svc
            .topup(
                &driver,
                Topup {
                    amount: Some(12.35),
                    payment_method: Some("UPI".into()),
                    card_last4: Some("4242".into()),
                },
            ).await.unwrap();
        assert_eq!(second.new_balance, 62.35);
        assert_ne!(first.transaction_id, second.transaction_id);

        let history = svc.list(&driver).await.unwrap();
        let stored = history
            .iter()
            .find(|t| t.id == second.transaction_id)
            .unwrap();
        assert_eq!(stored.card_last4.as_deref(), Some("4242"));
        assert_eq!(stored.payment_method, "UPI");

        let err = svc.topup(&driver, Topup::of(0.0)).await.unwrap_err();
        assert_eq!(err.to_string(), "Amount must be positive");
    }

    #[tokio::test]
    async fn wallet_charges_reduce_balance_but_never_below_zero() {
        let (svc, _, driver) = setup().await;
        svc.topup(&driver, Topup::of(10.0)).await.unwrap();
        svc.process(
            &driver,
            PaymentRequest {
                amount: Some(4.0),
                payment_method: Some("Wallet".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(svc.balance(&driver, &driver.user_id).await.unwrap(), 6.0);

        svc.process(
            &driver,
            PaymentRequest {
                amount: Some(20.0),
                payment_method: Some("Wallet".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(svc.balance(&driver, &driver.user_id).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn process_defaults_and_validation() {
        let (svc, _, driver) = setup().await;
        let tx = svc
            .process(&driver, PaymentRequest { amount: Some(3.5), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Charging);
        assert_eq!(tx.payment_method, "Card");
        assert_eq!(tx.description, "Payment");

        let err = svc.process(&driver, PaymentRequest::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "amount must be greater than 0");

        let err = svc
            .process(
                &driver,
                PaymentRequest {
                    amount: Some(1.0),
                    session_id: Some("nope".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid sessionId");

        let err = svc
            .process(
                &driver,
                PaymentRequest {
                    amount: Some(1.0),
                    transaction_type: Some("gift".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn operators_see_payments_for_their_sessions() {
        let (svc, repos, driver) = setup().await;
        let op = create_user(repos.as_ref(), "op@example.com", UserRole::Operator).await;
        let station = create_station(repos.as_ref(), &op.id).await;
        let sessions = SessionService::new(repos.clone());
        let session = sessions
            .start(
                &driver,
                StartSession {
                    station_id: Some(station.id.clone()),
                    port_id: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        sessions.stop(&driver, &session.id).await.unwrap();
        svc.topup(&driver, Topup::of(5.0)).await.unwrap();

        let operator = Actor::new(op.id, UserRole::Operator);
        let seen = svc.list(&operator).await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].session_id.as_deref(), Some(session.id.as_str()));
        assert_eq!(svc.list(&driver).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn balance_is_self_or_admin() {
        let (svc, _, _) = setup().await;
        let other = Actor::new("someone-else", UserRole::User);
        assert!(matches!(
            svc.balance(&other, "victim").await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn summary_groups_charging_by_month() {
        let mut a = Transaction::completed("u", 10.0, TransactionType::Charging, "Card", "x");
        a.timestamp = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
        let mut b = a.clone();
        b.amount = 2.555;
        let mut c = a.clone();
        c.timestamp = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let topup = Transaction::completed("u", 30.0, TransactionType::WalletTopup, "Card", "x");

        let s = PaymentSummary::from_transactions(&[a, b, c, topup]);
        assert_eq!(s.transaction_count, 4);
        assert_eq!(s.total_topup, 30.0);
        assert_eq!(s.monthly_spending.len(), 2);
        assert_eq!(s.monthly_spending["2025-02"], 10.0);
        assert!((s.monthly_spending["2025-01"] - 12.56).abs() < 0.011);
    }
}
