// 🧾 Transaction Record - the engine's only output
// One immutable value per notification; the caller owns it entirely

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// EXTRACTED (intermediate)
// ============================================================================

/// What an extractor pulls out of a message, before the router stamps
/// the routing tag and the raw text onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub balance: Option<Decimal>,
}

impl Extracted {
    pub fn new(amount: Decimal, occurred_at: DateTime<Utc>) -> Self {
        Extracted {
            amount,
            occurred_at,
            balance: None,
        }
    }

    /// Builder pattern: attach an optional balance
    pub fn with_balance(mut self, balance: Option<Decimal>) -> Self {
        self.balance = balance;
        self
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// TransactionRecord - normalized deposit notification
///
/// - `amount` is positive for deposits, negative for withdrawals where the
///   bank's wording lets us tell (KBANK read notifications)
/// - `occurred_at` falls back to the caller's received time when the message
///   carries no timestamp
/// - `balance` is `None` when the message doesn't state one (never zero)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    amount: Decimal,
    occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    balance: Option<Decimal>,
    bank_type: String,
    raw_message: String,
}

impl TransactionRecord {
    pub(crate) fn from_extracted(bank_type: &str, raw_message: &str, extracted: Extracted) -> Self {
        TransactionRecord {
            amount: extracted.amount,
            occurred_at: extracted.occurred_at,
            balance: extracted.balance,
            bank_type: bank_type.to_string(),
            raw_message: raw_message.to_string(),
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }

    /// Routing tag exactly as the caller supplied it
    pub fn bank_type(&self) -> &str {
        &self.bank_type
    }

    pub fn raw_message(&self) -> &str {
        &self.raw_message
    }

    pub fn is_deposit(&self) -> bool {
        self.amount.is_sign_positive()
    }
}
