//! Instrument error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendwise_shared::AppError;
use spendwise_shared::types::InstrumentId;
use thiserror::Error;

use super::types::InstrumentKind;
use crate::store::StoreError;

/// Errors raised while registering, updating or routing through an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    // ========== Lookup Errors ==========
    /// No live instrument of that kind exists for the owner.
    #[error("{kind} card not found: {id}")]
    NotFound {
        /// Referenced instrument.
        id: InstrumentId,
        /// Kind the payment method requires.
        kind: InstrumentKind,
    },

    /// No live instrument with this id exists for the owner.
    #[error("Instrument not found: {0}")]
    UnknownInstrument(InstrumentId),

    /// The payment method needs an instrument but none was referenced.
    #[error("No {0} card referenced by the expense")]
    MissingReference(InstrumentKind),

    // ========== Funding Errors ==========
    /// Debit balance does not cover the amount.
    #[error("Insufficient balance on card {id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// Debit card.
        id: InstrumentId,
        /// Current balance.
        balance: Decimal,
        /// Expense amount.
        requested: Decimal,
    },

    /// Charging the amount would exceed the credit limit.
    #[error("Credit limit exceeded on card {id}: limit {limit}, usage {usage}, requested {requested}")]
    CreditLimitExceeded {
        /// Credit card.
        id: InstrumentId,
        /// Credit limit.
        limit: Decimal,
        /// Current usage.
        usage: Decimal,
        /// Total purchase amount.
        requested: Decimal,
    },

    /// Shifting the purchase to the next billing cycle left the calendar.
    #[error("Billing date out of range for purchase dated {0}")]
    BillingDateOutOfRange(NaiveDate),

    // ========== Validation Errors ==========
    /// Card number is not exactly 16 digits.
    #[error("Card number must be exactly 16 digits")]
    InvalidCardNumber,

    /// Brand is not in the accepted list.
    #[error("Unknown card brand: {0:?}")]
    UnknownBrand(String),

    /// Closing day outside 1-31.
    #[error("Closing day must be between 1 and 31, got {0}")]
    InvalidClosingDay(u32),

    /// Validity date is today or in the past.
    #[error("Card validity {valid_until} must be after {today}")]
    Expired {
        /// Requested validity date.
        valid_until: NaiveDate,
        /// Date the check was made on.
        today: NaiveDate,
    },

    /// Credit limit must be positive.
    #[error("Credit limit must be greater than zero, got {0}")]
    NonPositiveLimit(Decimal),

    /// Debit balance cannot be negative.
    #[error("Balance cannot be negative, got {0}")]
    NegativeBalance(Decimal),

    /// Usage must stay within `0..=limit`.
    #[error("Usage {usage} must be between zero and the limit {limit}")]
    InvalidUsage {
        /// Requested usage.
        usage: Decimal,
        /// Credit limit.
        limit: Decimal,
    },

    /// The owner already has a live card with this number.
    #[error("Card number is already registered")]
    DuplicateCardNumber,

    /// Field does not apply to this kind of card.
    #[error("Field {field} does not apply to a {kind} card")]
    FieldNotApplicable {
        /// Field name.
        field: &'static str,
        /// Instrument kind.
        kind: InstrumentKind,
    },

    // ========== Store Errors ==========
    /// Ledger store failure or version conflict.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<InstrumentError> for AppError {
    fn from(err: InstrumentError) -> Self {
        match err {
            InstrumentError::NotFound { .. }
            | InstrumentError::UnknownInstrument(_)
            | InstrumentError::MissingReference(_) => Self::NotFound(err.to_string()),
            InstrumentError::InsufficientBalance { .. }
            | InstrumentError::CreditLimitExceeded { .. } => Self::BusinessRule(err.to_string()),
            InstrumentError::InvalidCardNumber
            | InstrumentError::UnknownBrand(_)
            | InstrumentError::InvalidClosingDay(_)
            | InstrumentError::Expired { .. }
            | InstrumentError::NonPositiveLimit(_)
            | InstrumentError::NegativeBalance(_)
            | InstrumentError::InvalidUsage { .. }
            | InstrumentError::DuplicateCardNumber
            | InstrumentError::FieldNotApplicable { .. }
            | InstrumentError::BillingDateOutOfRange(_) => Self::Validation(err.to_string()),
            InstrumentError::Store(store) => store.into(),
        }
    }
}
