//! Transaction aggregate
//!
//! Charges, wallet top-ups and refunds. The wallet balance is never stored;
//! it is derived from this ledger on every read.

pub mod model;
pub mod repository;

pub use model::{
    wallet_balance, Transaction, TransactionStatus, TransactionType, CHARGING_DESCRIPTION,
    DEFAULT_CARD_METHOD, TOPUP_DESCRIPTION, WALLET_PAYMENT_METHOD,
};
pub use repository::TransactionRepository;
