//! Budget data types.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendwise_shared::types::{IncomeId, UserId};

use super::error::BudgetError;
use crate::tombstone::SoftDelete;

/// A calendar month used as the budget window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BudgetPeriod {
    first_day: NaiveDate,
}

impl BudgetPeriod {
    /// Creates the period for a year and month (1-12).
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::InvalidPeriod` if the pair is not a calendar month.
    pub fn new(year: i32, month: u32) -> Result<Self, BudgetError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or(BudgetError::InvalidPeriod { year, month })
    }

    /// Returns the period the date falls in.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// Calendar month (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// First day of the month.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Returns true if the date falls within this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Income and spending recorded for one owner in one period.
///
/// Both totals already exclude soft-deleted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    /// Period the totals cover.
    pub period: BudgetPeriod,
    /// Sum of live income amounts.
    pub income: Decimal,
    /// Sum of live expense amounts.
    pub spent: Decimal,
}

impl BudgetSnapshot {
    /// Income minus spending.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.income - self.spent
    }
}

/// An income row. Income feeds the budget and is otherwise managed outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    /// Income ID.
    pub id: IncomeId,
    /// Owning user.
    pub owner_id: UserId,
    /// Amount received (> 0).
    pub amount: Decimal,
    /// Date received.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete for Income {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
