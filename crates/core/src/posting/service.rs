//! Posting service.
//!
//! A posting runs, in order: draft checks, category lookup, budget check,
//! instrument routing, then one atomic commit of the instrument and the new
//! expense rows. Nothing is written unless every step succeeds.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use spendwise_shared::types::{CategoryId, ExpenseId, InstrumentId, UserId};
use tracing::{info, warn};

use super::error::PostingError;
use crate::budget::{BudgetLedger, BudgetPeriod};
use crate::expense::{Expense, ExpenseDraft, ExpensePatch};
use crate::instrument::{InstrumentError, PaymentInstrumentRouter};
use crate::store::{LedgerStoreRef, Posting, StoreError};

/// Posting service over a ledger store.
#[derive(Clone)]
pub struct PostingService {
    store: LedgerStoreRef,
}

impl PostingService {
    /// Creates a new posting service.
    #[must_use]
    pub fn new(store: LedgerStoreRef) -> Self {
        Self { store }
    }

    /// Posts a new expense.
    ///
    /// The budget check runs against the calendar month containing `today`,
    /// whatever the expense date, and applies to every payment method.
    /// Returns the committed rows and the saved card.
    ///
    /// # Errors
    ///
    /// - `PostingError::InvalidAmount` / `InvalidInstallments` for a malformed draft
    /// - `PostingError::CategoryNotFound` if the category is missing or deleted
    /// - `PostingError::Budget` if the month's available income does not cover the amount
    /// - `PostingError::Instrument` if the card is missing or its funding rule fails
    /// - `PostingError::Store` with a conflict if the card changed concurrently
    pub async fn post_expense(
        &self,
        owner: UserId,
        draft: ExpenseDraft,
        today: NaiveDate,
    ) -> Result<Posting, PostingError> {
        Self::check_amount(draft.amount)?;
        if let Some(count) = draft.installments {
            Self::check_installments(count)?;
        }
        self.ensure_category(draft.category_id).await?;

        let period = BudgetPeriod::containing(today);
        let snapshot = self.store.budget_snapshot(owner, period).await?;
        if let Err(err) = BudgetLedger::validate(&snapshot, draft.amount) {
            warn!(owner = %owner, period = %period, error = %err, "Expense rejected by budget");
            return Err(err.into());
        }

        let routed = match PaymentInstrumentRouter::route(self.store.as_ref(), owner, draft).await {
            Ok(routed) => routed,
            Err(err) => {
                warn!(owner = %owner, error = %err, "Expense rejected by instrument");
                return Err(err.into());
            }
        };

        let now = Utc::now();
        let instrument_id = routed.instrument.as_ref().map(|i| i.id);
        let expenses = routed
            .drafts
            .into_iter()
            .map(|draft| Expense::record(owner, draft, routed.instrument_id, now))
            .collect();

        let posting = Posting {
            instrument: routed.instrument,
            expenses,
        };
        match self.store.commit_posting(posting).await {
            Ok(posting) => {
                info!(
                    owner = %owner,
                    method = ?routed.method,
                    rows = posting.expenses.len(),
                    "Expense posted"
                );
                Ok(posting)
            }
            Err(err) => Err(self.instrument_conflict(owner, instrument_id, err).await),
        }
    }

    /// Edits a live expense.
    ///
    /// When the amount or date changes the budget is re-checked for the month
    /// containing `today`, with the old amount added back. The card is never
    /// re-routed.
    ///
    /// # Errors
    ///
    /// - `PostingError::ExpenseNotFound` if the expense is missing, deleted or gone after a conflict
    /// - `PostingError::Budget` if the new amount does not fit
    /// - `PostingError::Store` with a conflict if the row changed concurrently
    pub async fn update_expense(
        &self,
        owner: UserId,
        id: ExpenseId,
        patch: &ExpensePatch,
        today: NaiveDate,
    ) -> Result<Expense, PostingError> {
        if let Some(amount) = patch.amount {
            Self::check_amount(amount)?;
        }
        if let Some(count) = patch.installments {
            Self::check_installments(count)?;
        }

        let original = self.load(owner, id).await?;
        if let Some(category_id) = patch.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut expense = original.clone();
        patch.apply(&mut expense);

        if expense.amount != original.amount || expense.date != original.date {
            let period = BudgetPeriod::containing(today);
            let snapshot = self.store.budget_snapshot(owner, period).await?;
            if let Err(err) =
                BudgetLedger::validate_replacement(&snapshot, original.amount, expense.amount)
            {
                warn!(owner = %owner, expense_id = %id, error = %err, "Expense update rejected by budget");
                return Err(err.into());
            }
        }

        expense.updated_at = Utc::now();
        match self.store.save_expense(expense).await {
            Ok(saved) => {
                info!(owner = %owner, expense_id = %id, version = saved.version, "Expense updated");
                Ok(saved)
            }
            Err(err) => Err(self.expense_conflict(owner, id, err).await),
        }
    }

    /// Soft-deletes an expense. Sibling installments and the card are untouched.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::ExpenseNotFound` if the expense is missing or already deleted.
    pub async fn delete_expense(&self, owner: UserId, id: ExpenseId) -> Result<(), PostingError> {
        let mut expense = self.load(owner, id).await?;
        let now = Utc::now();
        expense.deleted_at = Some(now);
        expense.updated_at = now;

        match self.store.save_expense(expense).await {
            Ok(_) => {
                info!(owner = %owner, expense_id = %id, "Expense deleted");
                Ok(())
            }
            Err(err) => Err(self.expense_conflict(owner, id, err).await),
        }
    }

    /// Live expense owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::ExpenseNotFound` if missing or deleted.
    pub async fn get_expense(&self, owner: UserId, id: ExpenseId) -> Result<Expense, PostingError> {
        self.load(owner, id).await
    }

    /// Live expenses owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the listing fails.
    pub async fn list_expenses(&self, owner: UserId) -> Result<Vec<Expense>, PostingError> {
        Ok(self.store.list_expenses(owner).await?)
    }

    fn check_amount(amount: Decimal) -> Result<(), PostingError> {
        if amount <= Decimal::ZERO {
            return Err(PostingError::InvalidAmount(amount));
        }
        Ok(())
    }

    fn check_installments(count: u32) -> Result<(), PostingError> {
        if count == 0 {
            return Err(PostingError::InvalidInstallments(count));
        }
        Ok(())
    }

    async fn ensure_category(&self, id: CategoryId) -> Result<(), PostingError> {
        self.store
            .find_category(id)
            .await?
            .map(|_| ())
            .ok_or(PostingError::CategoryNotFound(id))
    }

    async fn load(&self, owner: UserId, id: ExpenseId) -> Result<Expense, PostingError> {
        self.store
            .find_expense(owner, id)
            .await?
            .ok_or(PostingError::ExpenseNotFound(id))
    }

    async fn expense_conflict(&self, owner: UserId, id: ExpenseId, err: StoreError) -> PostingError {
        if !err.is_conflict() {
            return err.into();
        }

        match self.store.find_expense(owner, id).await {
            Ok(None) => PostingError::ExpenseNotFound(id),
            Ok(Some(_)) => {
                warn!(owner = %owner, expense_id = %id, "Expense changed concurrently");
                err.into()
            }
            Err(lookup) => lookup.into(),
        }
    }

    async fn instrument_conflict(
        &self,
        owner: UserId,
        id: Option<InstrumentId>,
        err: StoreError,
    ) -> PostingError {
        let Some(id) = id.filter(|_| err.is_conflict()) else {
            return err.into();
        };

        match self.store.find_instrument(owner, id).await {
            Ok(None) => InstrumentError::UnknownInstrument(id).into(),
            Ok(Some(_)) => {
                warn!(owner = %owner, instrument_id = %id, "Instrument changed during posting");
                err.into()
            }
            Err(lookup) => lookup.into(),
        }
    }
}
