//! Transaction domain model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback category for expenses no rule matched
pub const OTHER_CATEGORY: &str = "Other";

/// Opaque owner partition key. Every transaction and rule belongs to
/// exactly one owner; the owner id is threaded explicitly through every
/// call instead of living in ambient session state.
pub type OwnerId = i64;

/// Whether a transaction brings money in or takes it out.
///
/// Derived from the amount sign, never stored independently: a zero
/// amount counts as an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    Income,
    Expense,
}

/// A single ledger transaction belonging to an owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: OwnerId,
    /// Calendar date only; statement exports carry no time of day
    pub date: NaiveDate,
    /// Free-text description as the bank printed it
    pub description: String,
    /// Signed amount: negative = expense, positive = income
    pub amount: Decimal,
    /// Account balance after this transaction, when the source supplied
    /// it (file imports). Manual entries have none.
    pub running_balance: Option<Decimal>,
    /// Assigned category. `None` for income; for expenses this is always
    /// `Some` and non-empty once the batch has been categorized.
    pub category: Option<String>,
}

impl Transaction {
    /// Create a new transaction with required fields
    pub fn new(
        owner_id: OwnerId,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            date,
            description: description.into(),
            amount,
            running_balance: None,
            category: None,
        }
    }

    pub fn kind(&self) -> TxKind {
        if self.amount > Decimal::ZERO {
            TxKind::Income
        } else {
            TxKind::Expense
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind() == TxKind::Expense
    }

    /// Absolute amount, for spend views that chart expenses as positive bars
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: i64) -> Transaction {
        Transaction::new(
            1,
            NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
            "ICA SUPERMARKET",
            Decimal::new(amount, 2),
        )
    }

    #[test]
    fn test_kind_follows_sign() {
        assert_eq!(tx(12_550).kind(), TxKind::Income);
        assert_eq!(tx(-12_550).kind(), TxKind::Expense);
    }

    #[test]
    fn test_zero_amount_is_expense() {
        assert_eq!(tx(0).kind(), TxKind::Expense);
    }

    #[test]
    fn test_magnitude_is_unsigned() {
        assert_eq!(tx(-9_900).magnitude(), Decimal::new(9_900, 2));
        assert_eq!(tx(9_900).magnitude(), Decimal::new(9_900, 2));
    }
}
