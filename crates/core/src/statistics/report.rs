//! Statistics report over an owner's live ledger.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendwise_shared::config::StatisticsConfig;
use spendwise_shared::types::{CategoryId, InstrumentId, UserId};
use tracing::debug;

use super::engine::{ConfidenceInterval, StatisticsEngine};
use super::error::StatisticsError;
use crate::budget::Income;
use crate::expense::Expense;
use crate::instrument::{CREDIT_CARD, Instrument};
use crate::store::LedgerStoreRef;
use crate::tombstone::live;

/// What the report breaks expenses down by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Payment method whose share is reported.
    pub payment_method: String,
    /// Category whose share is reported.
    pub category_id: Option<CategoryId>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            payment_method: CREDIT_CARD.to_string(),
            category_id: None,
        }
    }
}

impl From<&StatisticsConfig> for ReportOptions {
    fn from(config: &StatisticsConfig) -> Self {
        Self {
            payment_method: config.payment_method.clone(),
            category_id: config.category_id,
        }
    }
}

/// Aggregate figures for one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsReport {
    /// Sum of live incomes.
    pub income_total: Decimal,
    /// Limit of each live credit card.
    pub credit_limits: BTreeMap<InstrumentId, Decimal>,
    /// Number of live expenses the statistics cover.
    pub expense_count: usize,
    /// Mean expense amount.
    pub mean: Decimal,
    /// Median expense amount.
    pub median: Decimal,
    /// Population variance of expense amounts.
    pub variance: Decimal,
    /// Population standard deviation of expense amounts.
    pub std_deviation: Decimal,
    /// 95% confidence interval for the mean.
    pub confidence_interval: ConfidenceInterval,
    /// Payment method the share below refers to.
    pub payment_method: String,
    /// Fraction of expenses paid with `payment_method`.
    pub payment_method_share: Decimal,
    /// Fraction of expenses in the configured category.
    pub category_share: Option<Decimal>,
    /// Normal density evaluated at the mean with the sample mean and deviation.
    ///
    /// This is always the peak of the curve, `1 / (σ·√(2π))`. `None` when
    /// every amount is equal.
    pub density_at_mean: Option<Decimal>,
}

impl StatisticsReport {
    /// Builds the report from already loaded rows. Deleted rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if there are no live expenses.
    pub fn compute(
        incomes: &[Income],
        instruments: &[Instrument],
        expenses: &[Expense],
        options: &ReportOptions,
    ) -> Result<Self, StatisticsError> {
        let income_total = live(incomes).map(|i| i.amount).sum();
        let credit_limits = live(instruments)
            .filter_map(|i| i.limit().map(|limit| (i.id, limit)))
            .collect();

        let expenses: Vec<Expense> = live(expenses).cloned().collect();
        let amounts: Vec<Decimal> = expenses.iter().map(|e| e.amount).collect();

        let mean = StatisticsEngine::mean(&amounts)?;
        let median = StatisticsEngine::median(&amounts)?;
        let variance = StatisticsEngine::variance(&amounts)?;
        let std_deviation = StatisticsEngine::std_deviation(&amounts)?;
        let confidence_interval =
            StatisticsEngine::confidence_interval(mean, std_deviation, amounts.len())?;

        let payment_method_share = StatisticsEngine::proportion(&expenses, &options.payment_method)?;
        let category_share = options
            .category_id
            .map(|category| StatisticsEngine::proportion_by_category(&expenses, category))
            .transpose()?;

        let density_at_mean = if std_deviation > Decimal::ZERO {
            Some(StatisticsEngine::normal_density(mean, mean, std_deviation)?)
        } else {
            None
        };

        Ok(Self {
            income_total,
            credit_limits,
            expense_count: amounts.len(),
            mean,
            median,
            variance,
            std_deviation,
            confidence_interval,
            payment_method: options.payment_method.clone(),
            payment_method_share,
            category_share,
            density_at_mean,
        })
    }
}

/// Read-only statistics over a ledger store.
#[derive(Clone)]
pub struct StatisticsService {
    store: LedgerStoreRef,
}

impl StatisticsService {
    /// Creates a new statistics service.
    #[must_use]
    pub fn new(store: LedgerStoreRef) -> Self {
        Self { store }
    }

    /// Computes the report for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::EmptyInput` if the owner has no live expenses,
    /// or a store error.
    pub async fn report(
        &self,
        owner: UserId,
        options: &ReportOptions,
    ) -> Result<StatisticsReport, StatisticsError> {
        let incomes = self.store.list_incomes(owner).await?;
        let instruments = self.store.list_instruments(owner).await?;
        let expenses = self.store.list_expenses(owner).await?;
        debug!(
            owner = %owner,
            incomes = incomes.len(),
            instruments = instruments.len(),
            expenses = expenses.len(),
            "Computing statistics report"
        );

        StatisticsReport::compute(&incomes, &instruments, &expenses, options)
    }
}
