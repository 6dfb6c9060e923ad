use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::payments::{PaymentRequest, PaymentSummary, Topup, TopupResult};
use crate::domain::Transaction;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: String,
    pub user_id: String,
    pub session_id: Option<String>,
    pub amount: f64,
    /// charging / wallet_topup / refund
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub status: String,
    pub payment_method: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionDto {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            session_id: t.session_id,
            amount: t.amount,
            transaction_type: t.transaction_type.as_str().to_string(),
            status: t.status.as_str().to_string(),
            payment_method: t.payment_method,
            description: t.description,
            card_last4: t.card_last4,
            timestamp: t.timestamp,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub amount: Option<f64>,
    pub session_id: Option<String>,
    /// Defaults to "charging"
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    #[validate(length(equal = 4, message = "cardLast4 must be 4 digits"))]
    pub card_last4: Option<String>,
}

impl From<ProcessPaymentRequest> for PaymentRequest {
    fn from(r: ProcessPaymentRequest) -> Self {
        Self {
            amount: r.amount,
            session_id: r.session_id,
            transaction_type: r.transaction_type,
            payment_method: r.payment_method,
            description: r.description,
            card_last4: r.card_last4,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopupRequest {
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    #[validate(length(equal = 4, message = "cardLast4 must be 4 digits"))]
    pub card_last4: Option<String>,
}

impl From<TopupRequest> for Topup {
    fn from(r: TopupRequest) -> Self {
        Self {
            amount: r.amount,
            payment_method: r.payment_method,
            card_last4: r.card_last4,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceDto {
    pub balance: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopupDto {
    pub new_balance: f64,
    pub transaction_id: String,
}

impl From<TopupResult> for TopupDto {
    fn from(r: TopupResult) -> Self {
        Self {
            new_balance: r.new_balance,
            transaction_id: r.transaction_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummaryDto {
    pub total_charging: f64,
    pub total_topup: f64,
    pub transaction_count: u64,
    /// `YYYY-MM` to charging spend
    pub monthly_spending: BTreeMap<String, f64>,
}

impl From<PaymentSummary> for PaymentSummaryDto {
    fn from(s: PaymentSummary) -> Self {
        Self {
            total_charging: s.total_charging,
            total_topup: s.total_topup,
            transaction_count: s.transaction_count,
            monthly_spending: s.monthly_spending,
        }
    }
}
