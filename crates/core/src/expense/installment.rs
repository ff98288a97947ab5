//! Installment expansion for credit purchases.
//!
//! A purchase of `total` split in `count` installments becomes `count`
//! independent expenses of `total / count`, truncated to cents, dated one
//! month apart starting at the base date. Each row is a single charge and
//! starts unpaid. The remainder lost to truncation is not redistributed.

use std::iter::FusedIterator;

use chrono::Months;
use rust_decimal::{Decimal, RoundingStrategy};

use super::types::ExpenseDraft;

/// Decimal places kept on each installment amount.
pub const INSTALLMENT_SCALE: u32 = 2;

/// Lazily yields the installment drafts of one purchase.
///
/// The sequence is finite and is consumed once; it cannot be restarted.
#[derive(Debug, Clone)]
pub struct Installments {
    base: ExpenseDraft,
    count: u32,
    share: Decimal,
    next: u32,
}

impl Installments {
    /// Expands `base` into `count` installments.
    ///
    /// A count of zero yields nothing. Returns `None` if the last installment
    /// date falls outside the calendar range.
    #[must_use]
    pub fn expand(base: ExpenseDraft, count: u32) -> Option<Self> {
        base.date
            .checked_add_months(Months::new(count.saturating_sub(1)))?;

        let share = base
            .amount
            .checked_div(Decimal::from(count))
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(INSTALLMENT_SCALE, RoundingStrategy::ToZero);

        Some(Self {
            base,
            count,
            share,
            next: 0,
        })
    }

    /// Amount of each installment.
    #[must_use]
    pub const fn share(&self) -> Decimal {
        self.share
    }
}

impl Iterator for Installments {
    type Item = ExpenseDraft;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        let date = self.base.date.checked_add_months(Months::new(index))?;
        self.next += 1;

        Some(ExpenseDraft {
            amount: self.share,
            date,
            description: format!(
                "{} - Installment {}/{}",
                self.base.description,
                index + 1,
                self.count
            ),
            installments: Some(1),
            paid: false,
            ..self.base.clone()
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.count - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Installments {}

impl FusedIterator for Installments {}
