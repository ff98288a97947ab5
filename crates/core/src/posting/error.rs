//! Posting error types.

use rust_decimal::Decimal;
use spendwise_shared::AppError;
use spendwise_shared::types::{CategoryId, ExpenseId};
use thiserror::Error;

use crate::budget::BudgetError;
use crate::instrument::InstrumentError;
use crate::store::StoreError;

/// Errors raised while posting, editing or deleting an expense.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostingError {
    /// Expense amount must be positive.
    #[error("Expense amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    /// Installment count must be at least one.
    #[error("Installment count must be at least 1, got {0}")]
    InvalidInstallments(u32),

    /// Referenced category is missing or deleted.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Expense is missing, deleted or owned by someone else.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Budget check failed.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Instrument resolution or funding rule failed.
    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    /// Ledger store failure or version conflict.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::InvalidAmount(_) | PostingError::InvalidInstallments(_) => {
                Self::Validation(err.to_string())
            }
            PostingError::CategoryNotFound(_) | PostingError::ExpenseNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            PostingError::Budget(e) => e.into(),
            PostingError::Instrument(e) => e.into(),
            PostingError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetPeriod;
    use rust_decimal_macros::dec;
    use spendwise_shared::types::InstrumentId;
    use uuid::Uuid;

    #[test]
    fn test_error_classification() {
        let period = BudgetPeriod::new(2025, 1).unwrap();
        let cases: Vec<(PostingError, &str)> = vec![
            (PostingError::InvalidAmount(dec!(0)), "VALIDATION_ERROR"),
            (PostingError::CategoryNotFound(CategoryId::new()), "NOT_FOUND"),
            (BudgetError::NoIncome { period }.into(), "BUSINESS_RULE_VIOLATION"),
            (
                InstrumentError::CreditLimitExceeded {
                    id: InstrumentId::new(),
                    limit: dec!(10),
                    usage: dec!(10),
                    requested: dec!(1),
                }
                .into(),
                "BUSINESS_RULE_VIOLATION",
            ),
            (
                InstrumentError::UnknownInstrument(InstrumentId::new()).into(),
                "NOT_FOUND",
            ),
            (
                StoreError::Conflict {
                    entity: "expense",
                    id: Uuid::nil(),
                }
                .into(),
                "CONFLICT",
            ),
            (StoreError::Backend("down".to_string()).into(), "DATABASE_ERROR"),
        ];

        for (err, code) in cases {
            assert_eq!(AppError::from(err).error_code(), code);
        }
    }
}
