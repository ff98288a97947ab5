//! Expense domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendwise_shared::types::{CategoryId, ExpenseId, InstrumentId, UserId};

use crate::tombstone::SoftDelete;

/// Expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Unique, non-empty name.
    pub name: String,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete for Category {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Input for posting an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    /// Amount (> 0).
    pub amount: Decimal,
    /// Purchase date.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Free-text payment method, e.g. `"credit card"`.
    pub payment_method: String,
    /// Number of installments; only meaningful for credit purchases.
    #[serde(default)]
    pub installments: Option<u32>,
    /// Category.
    pub category_id: CategoryId,
    /// Credit card charged when paying by credit card.
    #[serde(default)]
    pub credit_instrument_id: Option<InstrumentId>,
    /// Debit card drawn on when paying by debit card.
    #[serde(default)]
    pub debit_instrument_id: Option<InstrumentId>,
    /// Whether the expense is already settled.
    #[serde(default)]
    pub paid: bool,
}

impl ExpenseDraft {
    /// Installment count, treating a missing count as one.
    #[must_use]
    pub fn installment_count(&self) -> u32 {
        self.installments.unwrap_or(1)
    }
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Owning user.
    pub owner_id: UserId,
    /// Category.
    pub category_id: CategoryId,
    /// Amount (> 0).
    pub amount: Decimal,
    /// Posting date, after any billing cycle shift.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Free-text payment method.
    pub payment_method: String,
    /// Installment count; `None` for debit purchases.
    pub installments: Option<u32>,
    /// Whether the expense is settled.
    pub paid: bool,
    /// Instrument the expense was paid with.
    pub instrument_id: Option<InstrumentId>,
    /// Optimistic concurrency token.
    pub version: i64,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete for Expense {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

impl Expense {
    /// Builds a new row from a finalized draft.
    #[must_use]
    pub fn record(
        owner: UserId,
        draft: ExpenseDraft,
        instrument_id: Option<InstrumentId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            owner_id: owner,
            category_id: draft.category_id,
            amount: draft.amount,
            date: draft.date,
            description: draft.description,
            payment_method: draft.payment_method,
            installments: draft.installments,
            paid: draft.paid,
            instrument_id,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of an expense. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePatch {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub date: Option<NaiveDate>,
    /// New description; blank values are ignored.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New payment method; blank values are ignored.
    pub payment_method: Option<String>,
    /// New installment count.
    pub installments: Option<u32>,
    /// New paid flag.
    pub paid: Option<bool>,
}

impl ExpensePatch {
    /// Copies the set fields onto the expense.
    pub fn apply(&self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
        if let Some(description) = non_blank(self.description.as_deref()) {
            expense.description = description.to_string();
        }
        if let Some(category_id) = self.category_id {
            expense.category_id = category_id;
        }
        if let Some(method) = non_blank(self.payment_method.as_deref()) {
            expense.payment_method = method.to_string();
        }
        if let Some(installments) = self.installments {
            expense.installments = Some(installments);
        }
        if let Some(paid) = self.paid {
            expense.paid = paid;
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expense() -> Expense {
        let draft = ExpenseDraft {
            amount: dec!(120),
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            description: "Groceries".to_string(),
            payment_method: "cash".to_string(),
            installments: None,
            category_id: CategoryId::new(),
            credit_instrument_id: None,
            debit_instrument_id: None,
            paid: true,
        };
        Expense::record(UserId::new(), draft, None, Utc::now())
    }

    #[test]
    fn test_record_copies_draft() {
        let row = expense();
        assert_eq!(row.amount, dec!(120));
        assert_eq!(row.description, "Groceries");
        assert_eq!(row.version, 0);
        assert!(row.is_live());
    }

    #[test]
    fn test_patch_ignores_blank_text() {
        let mut row = expense();
        let patch = ExpensePatch {
            amount: Some(dec!(80)),
            description: Some("   ".to_string()),
            payment_method: Some(String::new()),
            paid: Some(false),
            ..ExpensePatch::default()
        };
        patch.apply(&mut row);

        assert_eq!(row.amount, dec!(80));
        assert_eq!(row.description, "Groceries");
        assert_eq!(row.payment_method, "cash");
        assert!(!row.paid);
    }

    #[test]
    fn test_missing_installments_counts_as_one() {
        let mut draft = ExpenseDraft {
            amount: dec!(1),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: String::new(),
            payment_method: String::new(),
            installments: None,
            category_id: CategoryId::new(),
            credit_instrument_id: None,
            debit_instrument_id: None,
            paid: false,
        };
        assert_eq!(draft.installment_count(), 1);
        draft.installments = Some(4);
        assert_eq!(draft.installment_count(), 4);
    }
}
