//! Monetary transaction domain entity

use chrono::{DateTime, Utc};

use crate::shared::round_money;

/// Payment method whose charges are deducted from the wallet.
pub const WALLET_PAYMENT_METHOD: &str = "Wallet";
pub const DEFAULT_CARD_METHOD: &str = "Card";
pub const CHARGING_DESCRIPTION: &str = "Charging session at station";
pub const TOPUP_DESCRIPTION: &str = "Wallet Top-up";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Charging,
    WalletTopup,
    Refund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charging => "charging",
            Self::WalletTopup => "wallet_topup",
            Self::Refund => "refund",
        }
    }

    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Charging)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "charging" => Some(Self::Charging),
            "wallet_topup" => Some(Self::WalletTopup),
            "refund" => Some(Self::Refund),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "pending" => Self::Pending,
            _ => Self::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub session_id: Option<String>,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub payment_method: String,
    pub description: String,
    pub card_last4: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// A completed transaction stamped with the current time.
    pub fn completed(
        user_id: impl Into<String>,
        amount: f64,
        transaction_type: TransactionType,
        payment_method: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            session_id: None,
            amount,
            transaction_type,
            status: TransactionStatus::Completed,
            payment_method: payment_method.into(),
            description: description.into(),
            card_last4: None,
            timestamp: now,
            created_at: now,
        }
    }

    /// The charge recorded when a session finishes.
    pub fn session_charge(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        amount: f64,
        payment_method: impl Into<String>,
    ) -> Self {
        let mut tx = Self::completed(
            user_id,
            amount,
            TransactionType::Charging,
            payment_method,
            CHARGING_DESCRIPTION,
        );
        tx.session_id = Some(session_id.into());
        tx
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    pub fn is_completed_charging(&self) -> bool {
        self.is_completed() && self.transaction_type == TransactionType::Charging
    }

    fn counts_as_topup(&self) -> bool {
        self.is_completed() && self.transaction_type == TransactionType::WalletTopup
    }

    fn counts_as_wallet_spend(&self) -> bool {
        self.is_completed_charging() && self.payment_method == WALLET_PAYMENT_METHOD
    }
}

/// Completed top-ups minus completed wallet-paid charges, to the cent.
/// May be negative; callers that display it clamp at zero.
pub fn wallet_balance<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    let mut topups = 0.0;
    let mut spent = 0.0;
    for tx in transactions {
        if tx.counts_as_topup() {
            topups += tx.amount;
        } else if tx.counts_as_wallet_spend() {
            spent += tx.amount;
        }
    }
    round_money(topups - spent)
}
