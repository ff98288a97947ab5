//! Property-based tests for the statistics engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::StatisticsEngine;

/// Strategy for generating non-empty lists of amounts with cents.
fn amounts_strategy() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)), 1..50)
}

proptest! {
    /// Mean and median lie between the smallest and largest value.
    #[test]
    fn test_central_values_within_range(values in amounts_strategy()) {
        let min = values.iter().copied().min().unwrap();
        let max = values.iter().copied().max().unwrap();

        let mean = StatisticsEngine::mean(&values).unwrap();
        let median = StatisticsEngine::median(&values).unwrap();

        prop_assert!(mean >= min && mean <= max);
        prop_assert!(median >= min && median <= max);
    }

    /// Variance is never negative and is zero for constant input.
    #[test]
    fn test_variance_non_negative(values in amounts_strategy()) {
        let variance = StatisticsEngine::variance(&values).unwrap();
        prop_assert!(variance >= Decimal::ZERO);

        let constant = vec![values[0]; values.len()];
        prop_assert_eq!(StatisticsEngine::variance(&constant).unwrap(), Decimal::ZERO);
    }

    /// Median does not depend on input order.
    #[test]
    fn test_median_order_independent(values in amounts_strategy()) {
        let mut reversed = values.clone();
        reversed.reverse();
        prop_assert_eq!(
            StatisticsEngine::median(&values).unwrap(),
            StatisticsEngine::median(&reversed).unwrap()
        );
    }

    /// The confidence interval contains the mean.
    #[test]
    fn test_confidence_interval_contains_mean(values in amounts_strategy()) {
        let mean = StatisticsEngine::mean(&values).unwrap();
        let sd = StatisticsEngine::std_deviation(&values).unwrap();
        let ci = StatisticsEngine::confidence_interval(mean, sd, values.len()).unwrap();

        prop_assert!(ci.lower <= mean && mean <= ci.upper);
    }
}
