//! Budget error types.

use rust_decimal::Decimal;
use spendwise_shared::AppError;
use thiserror::Error;

use super::types::BudgetPeriod;

/// Budget-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Nothing is left to spend in the period.
    #[error("No income available for {period}")]
    NoIncome {
        /// Period that was checked.
        period: BudgetPeriod,
    },

    /// The requested amount exceeds what is left in the period.
    #[error("Insufficient available income for {period}: requested {requested}, available {available}")]
    InsufficientIncome {
        /// Period that was checked.
        period: BudgetPeriod,
        /// Amount the expense asks for.
        requested: Decimal,
        /// Income minus recorded expenses in the period.
        available: Decimal,
    },

    /// Year/month pair is not a calendar month.
    #[error("Invalid budget period: {year}-{month}")]
    InvalidPeriod {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
    },
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::InvalidPeriod { .. } => Self::Validation(err.to_string()),
            BudgetError::NoIncome { .. } | BudgetError::InsufficientIncome { .. } => {
                Self::BusinessRule(err.to_string())
            }
        }
    }
}
