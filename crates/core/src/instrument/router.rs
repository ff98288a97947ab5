//! Payment instrument routing.
//!
//! Resolves the card an expense is paid with, applies the debit or credit
//! rules and returns the mutated card together with the finalized drafts.
//! Nothing is written here; the caller commits the result.

use chrono::{Datelike, Months, NaiveDate};
use spendwise_shared::types::{InstrumentId, UserId};
use tracing::debug;

use super::error::InstrumentError;
use super::payment::PaymentMethod;
use super::types::{Instrument, InstrumentKind};
use crate::expense::{ExpenseDraft, Installments};
use crate::store::LedgerStore;

/// Outcome of routing one expense draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedExpense {
    /// Classified payment method.
    pub method: PaymentMethod,
    /// Card to save, when its balance or usage changed.
    pub instrument: Option<Instrument>,
    /// Card recorded on every resulting expense row.
    pub instrument_id: Option<InstrumentId>,
    /// Expense rows to insert: one, or one per installment.
    pub drafts: Vec<ExpenseDraft>,
}

/// Routes expenses through debit and credit cards.
pub struct PaymentInstrumentRouter;

impl PaymentInstrumentRouter {
    /// Resolves the referenced card through the store and routes the draft.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::MissingReference` or `InstrumentError::NotFound`
    /// if the card cannot be resolved, and the debit or credit rule errors.
    pub async fn route(
        store: &dyn LedgerStore,
        owner: UserId,
        draft: ExpenseDraft,
    ) -> Result<RoutedExpense, InstrumentError> {
        let method = PaymentMethod::classify(&draft.payment_method);
        debug!(owner = %owner, method = ?method, "Routing expense");

        match method.instrument_kind() {
            Some(kind) => {
                let instrument = Self::resolve(store, owner, &draft, kind).await?;
                match kind {
                    InstrumentKind::Debit => Self::route_debit(draft, instrument),
                    InstrumentKind::Credit => Self::route_credit(draft, instrument),
                }
            }
            None => Ok(Self::route_other(draft)),
        }
    }

    async fn resolve(
        store: &dyn LedgerStore,
        owner: UserId,
        draft: &ExpenseDraft,
        kind: InstrumentKind,
    ) -> Result<Instrument, InstrumentError> {
        let id = match kind {
            InstrumentKind::Debit => draft.debit_instrument_id,
            InstrumentKind::Credit => draft.credit_instrument_id,
        }
        .ok_or(InstrumentError::MissingReference(kind))?;

        store
            .find_instrument(owner, id)
            .await?
            .filter(|instrument| instrument.kind() == kind)
            .ok_or(InstrumentError::NotFound { id, kind })
    }

    /// Debit purchases are immediate and single-shot.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::InsufficientBalance` if `amount > balance`.
    pub fn route_debit(
        mut draft: ExpenseDraft,
        mut instrument: Instrument,
    ) -> Result<RoutedExpense, InstrumentError> {
        let balance = instrument.debit(draft.amount)?;
        debug!(instrument_id = %instrument.id, balance = %balance, "Debit applied");

        draft.paid = true;
        draft.installments = None;

        Ok(RoutedExpense {
            method: PaymentMethod::DebitCard,
            instrument_id: Some(instrument.id),
            instrument: Some(instrument),
            drafts: vec![draft],
        })
    }

    /// Credit purchases check the limit against the full amount, roll past
    /// the closing day into the next cycle and split into installments.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentError::CreditLimitExceeded` if `usage + amount > limit`,
    /// or `InstrumentError::BillingDateOutOfRange` if the billing date or the
    /// last installment date cannot be represented.
    pub fn route_credit(
        mut draft: ExpenseDraft,
        mut instrument: Instrument,
    ) -> Result<RoutedExpense, InstrumentError> {
        instrument.ensure_headroom(draft.amount)?;

        if let Some(closing_day) = instrument.closing_day() {
            draft.date = Self::billing_date(draft.date, closing_day)
                .ok_or(InstrumentError::BillingDateOutOfRange(draft.date))?;
        }

        let count = draft.installment_count();
        if count > 1 {
            debug!(instrument_id = %instrument.id, count, "Splitting credit purchase");
            let billed = draft.date;
            let installments = Installments::expand(draft, count)
                .ok_or(InstrumentError::BillingDateOutOfRange(billed))?;
            return Ok(RoutedExpense {
                method: PaymentMethod::CreditCard,
                instrument: None,
                instrument_id: Some(instrument.id),
                drafts: installments.collect(),
            });
        }

        let usage = instrument.charge(draft.amount)?;
        debug!(instrument_id = %instrument.id, usage = %usage, "Credit charged");

        Ok(RoutedExpense {
            method: PaymentMethod::CreditCard,
            instrument_id: Some(instrument.id),
            instrument: Some(instrument),
            drafts: vec![draft],
        })
    }

    /// Any other payment method is recorded as-is.
    #[must_use]
    pub fn route_other(draft: ExpenseDraft) -> RoutedExpense {
        RoutedExpense {
            method: PaymentMethod::Other,
            instrument: None,
            instrument_id: draft.credit_instrument_id.or(draft.debit_instrument_id),
            drafts: vec![draft],
        }
    }

    /// Date a credit purchase posts on: one month later when made after the closing day.
    ///
    /// Returns `None` only if the shifted date is not representable.
    #[must_use]
    pub fn billing_date(date: NaiveDate, closing_day: u32) -> Option<NaiveDate> {
        if date.day() > closing_day {
            date.checked_add_months(Months::new(1))
        } else {
            Some(date)
        }
    }
}
