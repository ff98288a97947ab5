//! Ledger store port.
//!
//! The engine never talks to a database directly. Every read and write goes
//! through [`LedgerStore`], which the Postgres crate and [`InMemoryLedgerStore`]
//! implement. Implementations must:
//!
//! - exclude soft-deleted rows from every lookup, total and listing;
//! - scope instrument, income and expense reads to the owner passed in;
//! - compare the `version` of a row being saved against the stored one and
//!   fail with [`StoreError::Conflict`] when they differ or the row is gone;
//! - apply a [`Posting`] atomically: either every write lands or none does.

mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use spendwise_shared::AppError;
use spendwise_shared::types::{CategoryId, ExpenseId, InstrumentId, UserId};
use thiserror::Error;
use uuid::Uuid;

use crate::budget::{BudgetPeriod, BudgetSnapshot, Income};
use crate::expense::{Category, Expense};
use crate::instrument::Instrument;

pub use in_memory::InMemoryLedgerStore;

/// Errors raised by a ledger store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The row changed or disappeared between read and write.
    #[error("Concurrent modification of {entity} {id}")]
    Conflict {
        /// Entity name, e.g. `"expense"`.
        entity: &'static str,
        /// Primary key of the row.
        id: Uuid,
    },

    /// The backing store failed.
    #[error("Store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if this is a version conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => Self::Conflict(err.to_string()),
            StoreError::Backend(msg) => Self::Database(msg),
        }
    }
}

/// Writes committed together by [`LedgerStore::commit_posting`].
///
/// On return the rows carry their stored versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Instrument whose balance or usage changed, if any.
    pub instrument: Option<Instrument>,
    /// New expense rows.
    pub expenses: Vec<Expense>,
}

/// Shared handle to a ledger store.
pub type LedgerStoreRef = Arc<dyn LedgerStore>;

/// Persistence port for incomes, expenses, instruments and categories.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Sum of live income amounts for the owner dated within the period.
    async fn income_total(&self, owner: UserId, period: BudgetPeriod)
    -> Result<Decimal, StoreError>;

    /// Sum of live expense amounts for the owner dated within the period.
    async fn expense_total(
        &self,
        owner: UserId,
        period: BudgetPeriod,
    ) -> Result<Decimal, StoreError>;

    /// Income and spending for the period.
    async fn budget_snapshot(
        &self,
        owner: UserId,
        period: BudgetPeriod,
    ) -> Result<BudgetSnapshot, StoreError> {
        let income = self.income_total(owner, period).await?;
        let spent = self.expense_total(owner, period).await?;
        Ok(BudgetSnapshot {
            period,
            income,
            spent,
        })
    }

    /// Live category by id.
    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    /// Live instrument owned by `owner`.
    async fn find_instrument(
        &self,
        owner: UserId,
        id: InstrumentId,
    ) -> Result<Option<Instrument>, StoreError>;

    /// Live instrument owned by `owner` with the given card number.
    async fn find_instrument_by_number(
        &self,
        owner: UserId,
        card_number: &str,
    ) -> Result<Option<Instrument>, StoreError>;

    /// Live expense owned by `owner`.
    async fn find_expense(
        &self,
        owner: UserId,
        id: ExpenseId,
    ) -> Result<Option<Expense>, StoreError>;

    /// Live expenses owned by `owner`, ordered by date.
    async fn list_expenses(&self, owner: UserId) -> Result<Vec<Expense>, StoreError>;

    /// Live incomes owned by `owner`, ordered by date.
    async fn list_incomes(&self, owner: UserId) -> Result<Vec<Income>, StoreError>;

    /// Live instruments owned by `owner`.
    async fn list_instruments(&self, owner: UserId) -> Result<Vec<Instrument>, StoreError>;

    /// Atomically saves the instrument (version-checked) and inserts the expenses.
    async fn commit_posting(&self, posting: Posting) -> Result<Posting, StoreError>;

    /// Saves an existing expense, version-checked.
    async fn save_expense(&self, expense: Expense) -> Result<Expense, StoreError>;

    /// Inserts a new instrument.
    ///
    /// Fails with [`StoreError::Conflict`] if the owner already has a live
    /// instrument with the same card number.
    async fn insert_instrument(&self, instrument: Instrument) -> Result<Instrument, StoreError>;

    /// Saves an existing instrument, version-checked.
    async fn save_instrument(&self, instrument: Instrument) -> Result<Instrument, StoreError>;
}
