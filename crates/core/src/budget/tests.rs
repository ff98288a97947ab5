//! Property-based tests for budget module.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::BudgetError;
use super::service::BudgetLedger;
use super::types::{BudgetPeriod, BudgetSnapshot};

/// Strategy for generating non-negative amounts with cents.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn snapshot(income: Decimal, spent: Decimal) -> BudgetSnapshot {
    BudgetSnapshot {
        period: BudgetPeriod::new(2025, 1).unwrap(),
        income,
        spent,
    }
}

proptest! {
    /// A posting is accepted exactly when it fits in a non-empty available amount.
    #[test]
    fn test_validate_accepts_iff_within_available(
        income in amount_strategy(),
        spent in amount_strategy(),
        requested in amount_strategy(),
    ) {
        let snap = snapshot(income, spent);
        let available = income - spent;
        let result = BudgetLedger::validate(&snap, requested);

        if available.is_zero() {
            let is_no_income = matches!(result, Err(BudgetError::NoIncome { .. }));
            prop_assert!(is_no_income);
        } else if requested > available {
            let is_insufficient = matches!(result, Err(BudgetError::InsufficientIncome { .. }));
            prop_assert!(is_insufficient);
        } else {
            prop_assert_eq!(result, Ok(available));
        }
    }

    /// Accepted postings never push spending above income.
    #[test]
    fn test_accepted_posting_keeps_spending_within_income(
        income in amount_strategy(),
        spent in amount_strategy(),
        requested in amount_strategy(),
    ) {
        prop_assume!(spent <= income);
        let snap = snapshot(income, spent);

        if BudgetLedger::validate(&snap, requested).is_ok() {
            prop_assert!(spent + requested <= income);
        }
    }

    /// Lowering an existing expense is always allowed.
    #[test]
    fn test_replacement_reduction_always_allowed(
        income in amount_strategy(),
        spent in amount_strategy(),
        replaced in amount_strategy(),
        reduction in amount_strategy(),
    ) {
        prop_assume!(reduction <= replaced);
        let snap = snapshot(income, spent);
        let new_amount = replaced - reduction;

        prop_assert!(BudgetLedger::validate_replacement(&snap, replaced, new_amount).is_ok());
    }
}
