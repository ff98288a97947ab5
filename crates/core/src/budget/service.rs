//! Budget check run before any instrument is touched.

use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::BudgetSnapshot;

/// Budget ledger for business logic.
///
/// The check is applied to every posting whatever the payment method: a
/// purchase that fits the card limit is still rejected when it exceeds the
/// month's available income.
pub struct BudgetLedger;

impl BudgetLedger {
    /// Validate a new expense against the period's available income.
    ///
    /// Returns the available amount the check was made against.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NoIncome` if nothing is available in the period.
    /// Returns `BudgetError::InsufficientIncome` if the amount exceeds what is available.
    pub fn validate(snapshot: &BudgetSnapshot, requested: Decimal) -> Result<Decimal, BudgetError> {
        Self::check(snapshot, snapshot.available(), requested)
    }

    /// Validate an amount that replaces an existing expense in the same period.
    ///
    /// The replaced amount is added back before comparing, so lowering an
    /// expense is never blocked.
    ///
    /// # Errors
    ///
    /// Same as [`BudgetLedger::validate`], evaluated against `available + replaced`.
    pub fn validate_replacement(
        snapshot: &BudgetSnapshot,
        replaced: Decimal,
        requested: Decimal,
    ) -> Result<Decimal, BudgetError> {
        let available = snapshot.available() + replaced;
        if requested <= replaced {
            return Ok(available);
        }

        Self::check(snapshot, available, requested)
    }

    fn check(
        snapshot: &BudgetSnapshot,
        available: Decimal,
        requested: Decimal,
    ) -> Result<Decimal, BudgetError> {
        if available.is_zero() {
            return Err(BudgetError::NoIncome {
                period: snapshot.period,
            });
        }

        if requested > available {
            return Err(BudgetError::InsufficientIncome {
                period: snapshot.period,
                requested,
                available,
            });
        }

        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::types::BudgetPeriod;
    use rust_decimal_macros::dec;

    fn snapshot(income: Decimal, spent: Decimal) -> BudgetSnapshot {
        BudgetSnapshot {
            period: BudgetPeriod::new(2025, 6).unwrap(),
            income,
            spent,
        }
    }

    #[test]
    fn test_within_budget() {
        let available = BudgetLedger::validate(&snapshot(dec!(1000), dec!(400)), dec!(600)).unwrap();
        assert_eq!(available, dec!(600));
    }

    #[test]
    fn test_no_income_for_period() {
        let result = BudgetLedger::validate(&snapshot(dec!(0), dec!(0)), dec!(10));
        assert!(matches!(result, Err(BudgetError::NoIncome { .. })));
    }

    #[test]
    fn test_fully_spent_period_reports_no_income() {
        let result = BudgetLedger::validate(&snapshot(dec!(500), dec!(500)), dec!(1));
        assert!(matches!(result, Err(BudgetError::NoIncome { .. })));
    }

    #[test]
    fn test_insufficient_income() {
        let result = BudgetLedger::validate(&snapshot(dec!(1000), dec!(400)), dec!(600.01));
        assert_eq!(
            result,
            Err(BudgetError::InsufficientIncome {
                period: BudgetPeriod::new(2025, 6).unwrap(),
                requested: dec!(600.01),
                available: dec!(600),
            })
        );
    }

    #[test]
    fn test_replacement_adds_old_amount_back() {
        // 1000 income, 900 spent of which 300 is the row being edited
        let snap = snapshot(dec!(1000), dec!(900));
        assert_eq!(
            BudgetLedger::validate_replacement(&snap, dec!(300), dec!(400)).unwrap(),
            dec!(400)
        );
        assert!(BudgetLedger::validate_replacement(&snap, dec!(300), dec!(400.01)).is_err());
    }

    #[test]
    fn test_replacement_never_blocks_reduction() {
        // Income was deleted after the expense was recorded
        let snap = snapshot(dec!(0), dec!(300));
        assert!(BudgetLedger::validate_replacement(&snap, dec!(300), dec!(100)).is_ok());
        assert!(BudgetLedger::validate_replacement(&snap, dec!(300), dec!(300)).is_ok());
    }
}
