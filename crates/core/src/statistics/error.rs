//! Statistics error types.

use spendwise_shared::AppError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while computing statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatisticsError {
    /// The statistic is undefined over no values.
    #[error("Cannot compute {0} of an empty set")]
    EmptyInput(&'static str),

    /// Confidence interval needs at least one sample.
    #[error("Sample size must be greater than zero")]
    NonPositiveSampleSize,

    /// Normal density needs a positive standard deviation.
    #[error("Standard deviation must be greater than zero")]
    NonPositiveStdDev,

    /// Decimal arithmetic overflowed or had no result.
    #[error("Arithmetic failure computing {0}")]
    Arithmetic(&'static str),

    /// Ledger store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<StatisticsError> for AppError {
    fn from(err: StatisticsError) -> Self {
        match err {
            StatisticsError::EmptyInput(_)
            | StatisticsError::NonPositiveSampleSize
            | StatisticsError::NonPositiveStdDev => Self::BusinessRule(err.to_string()),
            StatisticsError::Arithmetic(_) => Self::Internal(err.to_string()),
            StatisticsError::Store(e) => e.into(),
        }
    }
}
