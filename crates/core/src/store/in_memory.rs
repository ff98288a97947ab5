use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use spendwise_shared::types::{CategoryId, ExpenseId, IncomeId, InstrumentId, UserId};
use tokio::sync::RwLock;

use super::{LedgerStore, Posting, StoreError};
use crate::budget::{BudgetPeriod, Income};
use crate::expense::{Category, Expense};
use crate::instrument::Instrument;
use crate::tombstone::{SoftDelete, live};

#[derive(Default)]
struct Tables {
    categories: HashMap<CategoryId, Category>,
    incomes: HashMap<IncomeId, Income>,
    instruments: HashMap<InstrumentId, Instrument>,
    expenses: HashMap<ExpenseId, Expense>,
}

impl Tables {
    /// Version-checked replacement of a live instrument.
    fn put_instrument(&mut self, mut instrument: Instrument) -> Result<Instrument, StoreError> {
        let current = self
            .instruments
            .get(&instrument.id)
            .filter(|row| row.is_live() && row.owner_id == instrument.owner_id);

        match current {
            Some(row) if row.version == instrument.version => {
                instrument.version += 1;
                self.instruments.insert(instrument.id, instrument.clone());
                Ok(instrument)
            }
            _ => Err(StoreError::Conflict {
                entity: "instrument",
                id: instrument.id.into_inner(),
            }),
        }
    }
}

/// A thread-safe in-memory ledger store.
///
/// All tables sit behind one `RwLock`, so a posting is applied atomically.
/// Used by tests and by callers that do not need persistence.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a category.
    pub async fn insert_category(&self, category: Category) {
        let mut tables = self.tables.write().await;
        tables.categories.insert(category.id, category);
    }

    /// Inserts or replaces an income.
    pub async fn insert_income(&self, income: Income) {
        let mut tables = self.tables.write().await;
        tables.incomes.insert(income.id, income);
    }
}

fn by_date<T>(mut rows: Vec<T>, date: impl Fn(&T) -> chrono::NaiveDate) -> Vec<T> {
    rows.sort_by_key(|row| date(row));
    rows
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn income_total(&self, owner: UserId, period: BudgetPeriod) -> Result<Decimal, StoreError> {
        let tables = self.tables.read().await;
        Ok(live(tables.incomes.values())
            .filter(|income| income.owner_id == owner && period.contains(income.date))
            .map(|income| income.amount)
            .sum())
    }

    async fn expense_total(
        &self,
        owner: UserId,
        period: BudgetPeriod,
    ) -> Result<Decimal, StoreError> {
        let tables = self.tables.read().await;
        Ok(live(tables.expenses.values())
            .filter(|expense| expense.owner_id == owner && period.contains(expense.date))
            .map(|expense| expense.amount)
            .sum())
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.get(&id).filter(|c| c.is_live()).cloned())
    }

    async fn find_instrument(
        &self,
        owner: UserId,
        id: InstrumentId,
    ) -> Result<Option<Instrument>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .instruments
            .get(&id)
            .filter(|i| i.is_live() && i.owner_id == owner)
            .cloned())
    }

    async fn find_instrument_by_number(
        &self,
        owner: UserId,
        card_number: &str,
    ) -> Result<Option<Instrument>, StoreError> {
        let tables = self.tables.read().await;
        Ok(live(tables.instruments.values())
            .find(|i| i.owner_id == owner && i.card_number == card_number)
            .cloned())
    }

    async fn find_expense(
        &self,
        owner: UserId,
        id: ExpenseId,
    ) -> Result<Option<Expense>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .expenses
            .get(&id)
            .filter(|e| e.is_live() && e.owner_id == owner)
            .cloned())
    }

    async fn list_expenses(&self, owner: UserId) -> Result<Vec<Expense>, StoreError> {
        let tables = self.tables.read().await;
        let rows = live(tables.expenses.values())
            .filter(|e| e.owner_id == owner)
            .cloned()
            .collect();
        Ok(by_date(rows, |e: &Expense| e.date))
    }

    async fn list_incomes(&self, owner: UserId) -> Result<Vec<Income>, StoreError> {
        let tables = self.tables.read().await;
        let rows = live(tables.incomes.values())
            .filter(|i| i.owner_id == owner)
            .cloned()
            .collect();
        Ok(by_date(rows, |i: &Income| i.date))
    }

    async fn list_instruments(&self, owner: UserId) -> Result<Vec<Instrument>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Instrument> = live(tables.instruments.values())
            .filter(|i| i.owner_id == owner)
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.created_at);
        Ok(rows)
    }

    async fn commit_posting(&self, posting: Posting) -> Result<Posting, StoreError> {
        let mut tables = self.tables.write().await;

        let instrument = match posting.instrument {
            Some(instrument) => Some(tables.put_instrument(instrument)?),
            None => None,
        };
        for expense in &posting.expenses {
            tables.expenses.insert(expense.id, expense.clone());
        }

        Ok(Posting {
            instrument,
            expenses: posting.expenses,
        })
    }

    async fn save_expense(&self, mut expense: Expense) -> Result<Expense, StoreError> {
        let mut tables = self.tables.write().await;
        let current = tables
            .expenses
            .get(&expense.id)
            .filter(|row| row.is_live() && row.owner_id == expense.owner_id);

        match current {
            Some(row) if row.version == expense.version => {
                expense.version += 1;
                tables.expenses.insert(expense.id, expense.clone());
                Ok(expense)
            }
            _ => Err(StoreError::Conflict {
                entity: "expense",
                id: expense.id.into_inner(),
            }),
        }
    }

    async fn insert_instrument(&self, instrument: Instrument) -> Result<Instrument, StoreError> {
        let mut tables = self.tables.write().await;
        let taken = live(tables.instruments.values()).any(|row| {
            row.owner_id == instrument.owner_id && row.card_number == instrument.card_number
        });
        if taken {
            return Err(StoreError::Conflict {
                entity: "instrument",
                id: instrument.id.into_inner(),
            });
        }
        tables.instruments.insert(instrument.id, instrument.clone());
        Ok(instrument)
    }

    async fn save_instrument(&self, instrument: Instrument) -> Result<Instrument, StoreError> {
        let mut tables = self.tables.write().await;
        tables.put_instrument(instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{CardBrand, Funding};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn income(owner: UserId, amount: Decimal, date: NaiveDate) -> Income {
        Income {
            id: IncomeId::new(),
            owner_id: owner,
            amount,
            date,
            description: "Salary".to_string(),
            deleted_at: None,
        }
    }

    fn debit_card(owner: UserId) -> Instrument {
        let now = Utc::now();
        Instrument {
            id: InstrumentId::new(),
            owner_id: owner,
            card_number: "4111111111111111".to_string(),
            brand: CardBrand::Visa,
            valid_until: ymd(2030, 1, 1),
            funding: Funding::Debit { balance: dec!(100) },
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_income_total_skips_deleted_and_other_periods() {
        let store = InMemoryLedgerStore::new();
        let owner = UserId::new();
        store.insert_income(income(owner, dec!(1000), ymd(2025, 3, 5))).await;
        store.insert_income(income(owner, dec!(200), ymd(2025, 4, 5))).await;
        store.insert_income(income(UserId::new(), dec!(999), ymd(2025, 3, 5))).await;
        let mut deleted = income(owner, dec!(50), ymd(2025, 3, 9));
        deleted.deleted_at = Some(Utc::now());
        store.insert_income(deleted).await;

        let period = BudgetPeriod::new(2025, 3).unwrap();
        assert_eq!(store.income_total(owner, period).await.unwrap(), dec!(1000));
        assert_eq!(store.list_incomes(owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let store = InMemoryLedgerStore::new();
        let owner = UserId::new();
        let card = store.insert_instrument(debit_card(owner)).await.unwrap();

        let saved = store.save_instrument(card.clone()).await.unwrap();
        assert_eq!(saved.version, 1);

        let err = store.save_instrument(card).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_failed_posting_writes_nothing() {
        let store = InMemoryLedgerStore::new();
        let owner = UserId::new();
        let mut card = store.insert_instrument(debit_card(owner)).await.unwrap();
        store.save_instrument(card.clone()).await.unwrap();

        card.funding = Funding::Debit { balance: dec!(0) };
        let expense = Expense {
            id: ExpenseId::new(),
            owner_id: owner,
            category_id: CategoryId::new(),
            amount: dec!(100),
            date: ymd(2025, 3, 1),
            description: "Stale".to_string(),
            payment_method: "debit card".to_string(),
            installments: None,
            paid: true,
            instrument_id: Some(card.id),
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        let result = store
            .commit_posting(Posting {
                instrument: Some(card),
                expenses: vec![expense],
            })
            .await;

        assert!(result.unwrap_err().is_conflict());
        assert!(store.list_expenses(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_card_number_is_unique_per_owner() {
        let store = InMemoryLedgerStore::new();
        let owner = UserId::new();
        let mut first = store.insert_instrument(debit_card(owner)).await.unwrap();

        assert!(store.insert_instrument(debit_card(owner)).await.unwrap_err().is_conflict());
        store.insert_instrument(debit_card(UserId::new())).await.unwrap();

        first.deleted_at = Some(Utc::now());
        store.save_instrument(first).await.unwrap();
        store.insert_instrument(debit_card(owner)).await.unwrap();
    }
}
