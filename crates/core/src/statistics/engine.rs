//! Descriptive statistics over expense amounts.
//!
//! Every function is pure and works in `Decimal`. Undefined results (empty
//! input, zero sample size) are errors, never a numeric default.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use spendwise_shared::types::CategoryId;

use super::error::StatisticsError;
use crate::expense::Expense;
use crate::instrument::matches_method;

/// z-score used for every confidence interval (95%, normal approximation).
pub const Z_95: Decimal = Decimal::from_parts(196, 0, 0, false, 2);

/// Two-sided confidence interval around a mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: Decimal,
    /// Upper bound.
    pub upper: Decimal,
}

/// Statistics engine.
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Arithmetic mean.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if `values` is empty.
    pub fn mean(values: &[Decimal]) -> Result<Decimal, StatisticsError> {
        if values.is_empty() {
            return Err(StatisticsError::EmptyInput("mean"));
        }
        let sum = checked_sum(values.iter().copied(), "mean")?;
        sum.checked_div(Decimal::from(values.len()))
            .ok_or(StatisticsError::Arithmetic("mean"))
    }

    /// Median: the middle value, or the mean of the two middle values for an even count.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if `values` is empty.
    pub fn median(values: &[Decimal]) -> Result<Decimal, StatisticsError> {
        if values.is_empty() {
            return Err(StatisticsError::EmptyInput("median"));
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            return Ok(sorted[mid]);
        }
        sorted[mid - 1]
            .checked_add(sorted[mid])
            .and_then(|pair| pair.checked_div(Decimal::TWO))
            .ok_or(StatisticsError::Arithmetic("median"))
    }

    /// Population variance (divides by `N`).
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if `values` is empty.
    pub fn variance(values: &[Decimal]) -> Result<Decimal, StatisticsError> {
        if values.is_empty() {
            return Err(StatisticsError::EmptyInput("variance"));
        }
        let mean = Self::mean(values)?;
        let squares = values
            .iter()
            .map(|v| {
                let deviation = v.checked_sub(mean)?;
                deviation.checked_mul(deviation)
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(StatisticsError::Arithmetic("variance"))?;

        checked_sum(squares, "variance")?
            .checked_div(Decimal::from(values.len()))
            .ok_or(StatisticsError::Arithmetic("variance"))
    }

    /// Population standard deviation.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if `values` is empty.
    pub fn std_deviation(values: &[Decimal]) -> Result<Decimal, StatisticsError> {
        if values.is_empty() {
            return Err(StatisticsError::EmptyInput("standard deviation"));
        }
        Self::variance(values)?
            .sqrt()
            .ok_or(StatisticsError::Arithmetic("standard deviation"))
    }

    /// 95% confidence interval: `mean ± 1.96 * std_dev / sqrt(n)`.
    ///
    /// The z-score is fixed whatever the sample size.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::NonPositiveSampleSize` if `sample_size` is zero.
    pub fn confidence_interval(
        mean: Decimal,
        std_dev: Decimal,
        sample_size: usize,
    ) -> Result<ConfidenceInterval, StatisticsError> {
        if sample_size == 0 {
            return Err(StatisticsError::NonPositiveSampleSize);
        }
        let margin = Decimal::from(sample_size)
            .sqrt()
            .and_then(|root| std_dev.checked_div(root))
            .and_then(|standard_error| Z_95.checked_mul(standard_error))
            .ok_or(StatisticsError::Arithmetic("confidence interval"))?;

        Ok(ConfidenceInterval {
            lower: mean - margin,
            upper: mean + margin,
        })
    }

    /// Fraction of expenses paid with `payment_method`, compared without regard to case.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if `expenses` is empty.
    pub fn proportion(expenses: &[Expense], payment_method: &str) -> Result<Decimal, StatisticsError> {
        Self::share(expenses, "proportion", |e| {
            matches_method(&e.payment_method, payment_method)
        })
    }

    /// Fraction of expenses in `category_id`.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if `expenses` is empty.
    pub fn proportion_by_category(
        expenses: &[Expense],
        category_id: CategoryId,
    ) -> Result<Decimal, StatisticsError> {
        Self::share(expenses, "category proportion", |e| e.category_id == category_id)
    }

    /// Probability density of `N(mean, std_dev²)` at `x`.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::NonPositiveStdDev` if `std_dev <= 0`.
    pub fn normal_density(
        x: Decimal,
        mean: Decimal,
        std_dev: Decimal,
    ) -> Result<Decimal, StatisticsError> {
        if std_dev <= Decimal::ZERO {
            return Err(StatisticsError::NonPositiveStdDev);
        }
        let z = (x - mean)
            .checked_div(std_dev)
            .ok_or(StatisticsError::Arithmetic("normal density"))?;
        let exponent = z
            .checked_mul(z)
            .map(|squared| -squared / Decimal::TWO)
            .ok_or(StatisticsError::Arithmetic("normal density"))?;
        // exp of a large negative exponent underflows to zero
        let kernel = exponent.checked_exp().unwrap_or(Decimal::ZERO);

        Decimal::TWO_PI
            .sqrt()
            .and_then(|root| std_dev.checked_mul(root))
            .and_then(|scale| kernel.checked_div(scale))
            .ok_or(StatisticsError::Arithmetic("normal density"))
    }

    fn share(
        expenses: &[Expense],
        statistic: &'static str,
        predicate: impl Fn(&Expense) -> bool,
    ) -> Result<Decimal, StatisticsError> {
        if expenses.is_empty() {
            return Err(StatisticsError::EmptyInput(statistic));
        }
        let hits = expenses.iter().filter(|e| predicate(e)).count();
        Decimal::from(hits)
            .checked_div(Decimal::from(expenses.len()))
            .ok_or(StatisticsError::Arithmetic(statistic))
    }
}

fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    statistic: &'static str,
) -> Result<Decimal, StatisticsError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or(StatisticsError::Arithmetic(statistic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use spendwise_shared::types::{ExpenseId, UserId};

    fn values(raw: &[i64]) -> Vec<Decimal> {
        raw.iter().copied().map(Decimal::from).collect()
    }

    fn expense(method: &str, category_id: CategoryId) -> Expense {
        let now = Utc::now();
        Expense {
            id: ExpenseId::new(),
            owner_id: UserId::new(),
            category_id,
            amount: dec!(10),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: String::new(),
            payment_method: method.to_string(),
            installments: None,
            paid: true,
            instrument_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[rstest]
    #[case(&[10, 20, 30, 40], dec!(25))]
    #[case(&[10, 20, 30], dec!(20))]
    #[case(&[40, 10, 30, 20], dec!(25))]
    #[case(&[7], dec!(7))]
    fn test_median(#[case] raw: &[i64], #[case] expected: Decimal) {
        assert_eq!(StatisticsEngine::median(&values(raw)).unwrap(), expected);
    }

    #[test]
    fn test_mean() {
        assert_eq!(StatisticsEngine::mean(&values(&[1, 2, 3, 4])).unwrap(), dec!(2.5));
    }

    #[test]
    fn test_population_variance_and_std_dev() {
        let data = values(&[2, 4, 4, 4, 5, 5, 7, 9]);
        assert_eq!(StatisticsEngine::variance(&data).unwrap(), dec!(4));
        assert_eq!(StatisticsEngine::std_deviation(&data).unwrap(), dec!(2));
    }

    #[rstest]
    #[case::mean(StatisticsEngine::mean(&[]), "mean")]
    #[case::median(StatisticsEngine::median(&[]), "median")]
    #[case::variance(StatisticsEngine::variance(&[]), "variance")]
    #[case::std_dev(StatisticsEngine::std_deviation(&[]), "standard deviation")]
    fn test_empty_input_fails(
        #[case] result: Result<Decimal, StatisticsError>,
        #[case] statistic: &'static str,
    ) {
        assert_eq!(result, Err(StatisticsError::EmptyInput(statistic)));
    }

    #[test]
    fn test_empty_proportion_fails() {
        assert_eq!(
            StatisticsEngine::proportion(&[], "x"),
            Err(StatisticsError::EmptyInput("proportion"))
        );
        assert!(StatisticsEngine::proportion_by_category(&[], CategoryId::new()).is_err());
    }

    #[test]
    fn test_confidence_interval_uses_fixed_z() {
        let ci = StatisticsEngine::confidence_interval(dec!(100), dec!(20), 4).unwrap();
        assert_eq!(ci.lower, dec!(80.4));
        assert_eq!(ci.upper, dec!(119.6));
    }

    #[test]
    fn test_confidence_interval_needs_samples() {
        assert_eq!(
            StatisticsEngine::confidence_interval(dec!(1), dec!(1), 0),
            Err(StatisticsError::NonPositiveSampleSize)
        );
    }

    #[test]
    fn test_proportion_is_case_insensitive() {
        let food = CategoryId::new();
        let expenses = vec![
            expense("Credit Card", food),
            expense("credit card", CategoryId::new()),
            expense("cash", food),
            expense("debit card", food),
        ];
        assert_eq!(
            StatisticsEngine::proportion(&expenses, "CREDIT CARD").unwrap(),
            dec!(0.5)
        );
        assert_eq!(
            StatisticsEngine::proportion_by_category(&expenses, food).unwrap(),
            dec!(0.75)
        );
    }

    #[test]
    fn test_normal_density_peak() {
        // 1 / sqrt(2π) ≈ 0.398942
        let peak = StatisticsEngine::normal_density(dec!(0), dec!(0), dec!(1)).unwrap();
        assert_eq!(peak.round_dp(6), dec!(0.398942));
    }

    #[test]
    fn test_normal_density_one_sigma() {
        // e^(-1/2) / sqrt(2π) ≈ 0.241971
        let value = StatisticsEngine::normal_density(dec!(12), dec!(10), dec!(2)).unwrap();
        assert_eq!((value * dec!(2)).round_dp(6), dec!(0.241971));
    }

    #[test]
    fn test_normal_density_far_tail_is_zero() {
        let value = StatisticsEngine::normal_density(dec!(1000), dec!(0), dec!(1)).unwrap();
        assert!(value < dec!(0.000001));
    }

    #[test]
    fn test_normal_density_needs_spread() {
        assert_eq!(
            StatisticsEngine::normal_density(dec!(1), dec!(1), Decimal::ZERO),
            Err(StatisticsError::NonPositiveStdDev)
        );
    }
}
