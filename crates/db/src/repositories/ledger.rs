//! Postgres ledger store.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use spendwise_core::budget::{BudgetPeriod, Income};
use spendwise_core::expense::{Category, Expense};
use spendwise_core::instrument::Instrument;
use spendwise_core::store::{LedgerStore, Posting, StoreError};
use spendwise_shared::types::{CategoryId, ExpenseId, InstrumentId, UserId};
use tracing::debug;
use uuid::Uuid;

use super::mapping::{
    FundingColumns, backend, category_active_model, expense_active_model, income_active_model,
    insert_error, installments_column, instrument_active_model,
};
use crate::entities::{Tombstoned, categories, expenses, incomes, instruments, users};

#[derive(Debug, FromQueryResult)]
struct Total {
    total: Option<Decimal>,
}

/// Ledger store backed by Postgres through `SeaORM`.
///
/// Saves are optimistic: the `UPDATE` matches on id, owner, version and a null
/// `deleted_at`, and zero affected rows is reported as a conflict.
#[derive(Debug, Clone)]
pub struct SeaLedgerStore {
    db: DatabaseConnection,
}

impl SeaLedgerStore {
    /// Creates a new store.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a user row.
    pub async fn insert_user(&self, id: UserId, name: &str) -> Result<(), StoreError> {
        users::ActiveModel {
            id: Set(id.into_inner()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| insert_error(e, "user", id.into_inner()))?;
        Ok(())
    }

    /// Inserts a category.
    pub async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        category_active_model(category)
            .insert(&self.db)
            .await
            .map_err(|e| insert_error(e, "category", category.id.into_inner()))?;
        Ok(())
    }

    /// Inserts an income.
    pub async fn insert_income(&self, income: &Income) -> Result<(), StoreError> {
        income_active_model(income)
            .insert(&self.db)
            .await
            .map_err(|e| insert_error(e, "income", income.id.into_inner()))?;
        Ok(())
    }

    async fn sum<E: EntityTrait>(
        &self,
        query: Select<E>,
        amount: E::Column,
    ) -> Result<Decimal, StoreError> {
        let total = query
            .select_only()
            .column_as(Expr::col(amount).sum(), "total")
            .into_model::<Total>()
            .one(&self.db)
            .await
            .map_err(backend)?;
        Ok(total.and_then(|t| t.total).unwrap_or(Decimal::ZERO))
    }
}

async fn update_instrument<C: ConnectionTrait>(
    conn: &C,
    instrument: Instrument,
) -> Result<Instrument, StoreError> {
    use instruments::Column;

    let funding = FundingColumns::split(&instrument)?;
    let result = instruments::Entity::update_many()
        .col_expr(Column::Brand, Expr::value(instrument.brand.as_str()))
        .col_expr(Column::ValidUntil, Expr::value(instrument.valid_until))
        .col_expr(Column::Balance, Expr::value(funding.balance))
        .col_expr(Column::CreditLimit, Expr::value(funding.credit_limit))
        .col_expr(Column::CreditUsage, Expr::value(funding.credit_usage))
        .col_expr(Column::ClosingDay, Expr::value(funding.closing_day))
        .col_expr(Column::Version, Expr::value(instrument.version + 1))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(instrument.updated_at.fixed_offset()),
        )
        .col_expr(
            Column::DeletedAt,
            Expr::value(instrument.deleted_at.map(|at| at.fixed_offset())),
        )
        .filter(Column::Id.eq(instrument.id.into_inner()))
        .filter(Column::OwnerId.eq(instrument.owner_id.into_inner()))
        .filter(Column::Version.eq(instrument.version))
        .filter(Column::DeletedAt.is_null())
        .exec(conn)
        .await
        .map_err(backend)?;

    if result.rows_affected == 0 {
        return Err(StoreError::Conflict {
            entity: "instrument",
            id: instrument.id.into_inner(),
        });
    }

    Ok(Instrument {
        version: instrument.version + 1,
        ..instrument
    })
}

async fn update_expense<C: ConnectionTrait>(
    conn: &C,
    expense: Expense,
) -> Result<Expense, StoreError> {
    use expenses::Column;

    let installments = installments_column(&expense)?;
    let result = expenses::Entity::update_many()
        .col_expr(Column::CategoryId, Expr::value(expense.category_id.into_inner()))
        .col_expr(Column::Amount, Expr::value(expense.amount))
        .col_expr(Column::ExpenseDate, Expr::value(expense.date))
        .col_expr(Column::Description, Expr::value(expense.description.clone()))
        .col_expr(
            Column::PaymentMethod,
            Expr::value(expense.payment_method.clone()),
        )
        .col_expr(Column::Installments, Expr::value(installments))
        .col_expr(Column::Paid, Expr::value(expense.paid))
        .col_expr(
            Column::InstrumentId,
            Expr::value(expense.instrument_id.map(InstrumentId::into_inner)),
        )
        .col_expr(Column::Version, Expr::value(expense.version + 1))
        .col_expr(Column::UpdatedAt, Expr::value(expense.updated_at.fixed_offset()))
        .col_expr(
            Column::DeletedAt,
            Expr::value(expense.deleted_at.map(|at| at.fixed_offset())),
        )
        .filter(Column::Id.eq(expense.id.into_inner()))
        .filter(Column::OwnerId.eq(expense.owner_id.into_inner()))
        .filter(Column::Version.eq(expense.version))
        .filter(Column::DeletedAt.is_null())
        .exec(conn)
        .await
        .map_err(backend)?;

    if result.rows_affected == 0 {
        return Err(StoreError::Conflict {
            entity: "expense",
            id: expense.id.into_inner(),
        });
    }

    Ok(Expense {
        version: expense.version + 1,
        ..expense
    })
}

fn owned_instruments(owner: UserId) -> Select<instruments::Entity> {
    instruments::Entity::live().filter(instruments::Column::OwnerId.eq(owner.into_inner()))
}

fn owned_expenses(owner: UserId) -> Select<expenses::Entity> {
    expenses::Entity::live().filter(expenses::Column::OwnerId.eq(owner.into_inner()))
}

fn owned_incomes(owner: UserId) -> Select<incomes::Entity> {
    incomes::Entity::live().filter(incomes::Column::OwnerId.eq(owner.into_inner()))
}

#[async_trait]
impl LedgerStore for SeaLedgerStore {
    async fn income_total(&self, owner: UserId, period: BudgetPeriod) -> Result<Decimal, StoreError> {
        let query = owned_incomes(owner).filter(
            incomes::Column::IncomeDate.between(period.first_day(), period.last_day()),
        );
        self.sum(query, incomes::Column::Amount).await
    }

    async fn expense_total(
        &self,
        owner: UserId,
        period: BudgetPeriod,
    ) -> Result<Decimal, StoreError> {
        let query = owned_expenses(owner).filter(
            expenses::Column::ExpenseDate.between(period.first_day(), period.last_day()),
        );
        self.sum(query, expenses::Column::Amount).await
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = categories::Entity::live()
            .filter(categories::Column::Id.eq(id.into_inner()))
            .one(&self.db)
            .await
            .map_err(backend)?;
        Ok(row.map(Category::from))
    }

    async fn find_instrument(
        &self,
        owner: UserId,
        id: InstrumentId,
    ) -> Result<Option<Instrument>, StoreError> {
        owned_instruments(owner)
            .filter(instruments::Column::Id.eq(id.into_inner()))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(Instrument::try_from)
            .transpose()
    }

    async fn find_instrument_by_number(
        &self,
        owner: UserId,
        card_number: &str,
    ) -> Result<Option<Instrument>, StoreError> {
        owned_instruments(owner)
            .filter(instruments::Column::CardNumber.eq(card_number))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(Instrument::try_from)
            .transpose()
    }

    async fn find_expense(
        &self,
        owner: UserId,
        id: ExpenseId,
    ) -> Result<Option<Expense>, StoreError> {
        owned_expenses(owner)
            .filter(expenses::Column::Id.eq(id.into_inner()))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(Expense::try_from)
            .transpose()
    }

    async fn list_expenses(&self, owner: UserId) -> Result<Vec<Expense>, StoreError> {
        owned_expenses(owner)
            .order_by_asc(expenses::Column::ExpenseDate)
            .order_by_asc(expenses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    async fn list_incomes(&self, owner: UserId) -> Result<Vec<Income>, StoreError> {
        let rows = owned_incomes(owner)
            .order_by_asc(incomes::Column::IncomeDate)
            .all(&self.db)
            .await
            .map_err(backend)?;
        Ok(rows.into_iter().map(Income::from).collect())
    }

    async fn list_instruments(&self, owner: UserId) -> Result<Vec<Instrument>, StoreError> {
        owned_instruments(owner)
            .order_by_asc(instruments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(Instrument::try_from)
            .collect()
    }

    async fn commit_posting(&self, posting: Posting) -> Result<Posting, StoreError> {
        // Dropping the transaction on an early return rolls it back
        let txn = self.db.begin().await.map_err(backend)?;

        let instrument = match posting.instrument {
            Some(instrument) => Some(update_instrument(&txn, instrument).await?),
            None => None,
        };
        for expense in &posting.expenses {
            expense_active_model(expense)?
                .insert(&txn)
                .await
                .map_err(|e| insert_error(e, "expense", expense.id.into_inner()))?;
        }

        txn.commit().await.map_err(backend)?;

        debug!(
            expenses = posting.expenses.len(),
            instrument_id = ?instrument.as_ref().map(|i| i.id),
            "Posting committed"
        );
        Ok(Posting {
            instrument,
            expenses: posting.expenses,
        })
    }

    async fn save_expense(&self, expense: Expense) -> Result<Expense, StoreError> {
        update_expense(&self.db, expense).await
    }

    async fn insert_instrument(&self, instrument: Instrument) -> Result<Instrument, StoreError> {
        let id: Uuid = instrument.id.into_inner();
        instrument_active_model(&instrument)?
            .insert(&self.db)
            .await
            .map_err(|e| insert_error(e, "instrument", id))?;
        Ok(instrument)
    }

    async fn save_instrument(&self, instrument: Instrument) -> Result<Instrument, StoreError> {
        update_instrument(&self.db, instrument).await
    }
}
