//! Payment method classification.
//!
//! Expenses carry the payment method as free text. Routing only cares whether
//! it names a debit card, a credit card or anything else, compared without
//! regard to case.

use serde::{Deserialize, Serialize};

use super::types::InstrumentKind;

/// Payment method text that routes through a debit card.
pub const DEBIT_CARD: &str = "debit card";

/// Payment method text that routes through a credit card.
pub const CREDIT_CARD: &str = "credit card";

/// How an expense is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid from a debit balance.
    DebitCard,
    /// Charged to a credit limit.
    CreditCard,
    /// Cash, transfer or anything else; no instrument involved.
    Other,
}

impl PaymentMethod {
    /// Classifies free-text payment method.
    #[must_use]
    pub fn classify(method: &str) -> Self {
        if matches_method(method, DEBIT_CARD) {
            Self::DebitCard
        } else if matches_method(method, CREDIT_CARD) {
            Self::CreditCard
        } else {
            Self::Other
        }
    }

    /// Instrument kind this method resolves, if any.
    #[must_use]
    pub const fn instrument_kind(&self) -> Option<InstrumentKind> {
        match self {
            Self::DebitCard => Some(InstrumentKind::Debit),
            Self::CreditCard => Some(InstrumentKind::Credit),
            Self::Other => None,
        }
    }
}

/// Case-insensitive payment method comparison.
#[must_use]
pub fn matches_method(method: &str, filter: &str) -> bool {
    method.to_lowercase() == filter.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("debit card", PaymentMethod::DebitCard)]
    #[case("Debit Card", PaymentMethod::DebitCard)]
    #[case("CREDIT CARD", PaymentMethod::CreditCard)]
    #[case("credit card", PaymentMethod::CreditCard)]
    #[case("cash", PaymentMethod::Other)]
    #[case("credit", PaymentMethod::Other)]
    #[case(" debit card", PaymentMethod::Other)]
    #[case("", PaymentMethod::Other)]
    fn test_classify(#[case] input: &str, #[case] expected: PaymentMethod) {
        assert_eq!(PaymentMethod::classify(input), expected);
    }

    #[test]
    fn test_instrument_kind() {
        assert_eq!(
            PaymentMethod::DebitCard.instrument_kind(),
            Some(InstrumentKind::Debit)
        );
        assert_eq!(
            PaymentMethod::CreditCard.instrument_kind(),
            Some(InstrumentKind::Credit)
        );
        assert_eq!(PaymentMethod::Other.instrument_kind(), None);
    }
}
