//! Conversions between entity models and ledger domain types.
//!
//! Rows that violate a domain invariant (unknown brand, credit card without a
//! limit) surface as [`StoreError::Backend`] instead of panicking.

use std::fmt::Display;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::DbErr;
use sea_orm::SqlErr;
use spendwise_core::budget::Income;
use spendwise_core::expense::{Category, Expense};
use spendwise_core::instrument::{CardBrand, Funding, Instrument, InstrumentKind};
use spendwise_core::store::StoreError;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::InstrumentKind as DbInstrumentKind;
use crate::entities::{categories, expenses, incomes, instruments};

pub(crate) fn backend(err: DbErr) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Maps a unique violation on insert to a conflict on `id`.
pub(crate) fn insert_error(err: DbErr, entity: &'static str, id: Uuid) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict { entity, id },
        _ => backend(err),
    }
}

fn corrupt(entity: &str, id: Uuid, detail: impl Display) -> StoreError {
    StoreError::Backend(format!("Corrupt {entity} row {id}: {detail}"))
}

impl From<InstrumentKind> for DbInstrumentKind {
    fn from(kind: InstrumentKind) -> Self {
        match kind {
            InstrumentKind::Debit => Self::Debit,
            InstrumentKind::Credit => Self::Credit,
        }
    }
}

/// Funding split into its nullable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct FundingColumns {
    pub balance: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub credit_usage: Option<Decimal>,
    pub closing_day: Option<i16>,
}

impl FundingColumns {
    pub(crate) fn split(instrument: &Instrument) -> Result<Self, StoreError> {
        match instrument.funding {
            Funding::Debit { balance } => Ok(Self {
                balance: Some(balance),
                ..Self::default()
            }),
            Funding::Credit {
                limit,
                usage,
                closing_day,
            } => {
                let closing_day = i16::try_from(closing_day).map_err(|_| {
                    corrupt("instrument", instrument.id.into_inner(), "closing day out of range")
                })?;
                Ok(Self {
                    balance: None,
                    credit_limit: Some(limit),
                    credit_usage: Some(usage),
                    closing_day: Some(closing_day),
                })
            }
        }
    }
}

pub(crate) fn installments_column(expense: &Expense) -> Result<Option<i32>, StoreError> {
    expense
        .installments
        .map(i32::try_from)
        .transpose()
        .map_err(|_| corrupt("expense", expense.id.into_inner(), "installment count out of range"))
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id.into(),
            name: model.name,
            deleted_at: model.deleted_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}

impl From<incomes::Model> for Income {
    fn from(model: incomes::Model) -> Self {
        Self {
            id: model.id.into(),
            owner_id: model.owner_id.into(),
            amount: model.amount,
            date: model.income_date,
            description: model.description,
            deleted_at: model.deleted_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}

impl TryFrom<instruments::Model> for Instrument {
    type Error = StoreError;

    fn try_from(model: instruments::Model) -> Result<Self, Self::Error> {
        let brand: CardBrand = model
            .brand
            .parse()
            .map_err(|err| corrupt("instrument", model.id, err))?;

        let funding = match model.kind {
            DbInstrumentKind::Debit => Funding::Debit {
                balance: model
                    .balance
                    .ok_or_else(|| corrupt("instrument", model.id, "debit card without balance"))?,
            },
            DbInstrumentKind::Credit => {
                let (Some(limit), Some(usage), Some(day)) =
                    (model.credit_limit, model.credit_usage, model.closing_day)
                else {
                    return Err(corrupt(
                        "instrument",
                        model.id,
                        "credit card without limit, usage or closing day",
                    ));
                };
                let closing_day = u32::try_from(day)
                    .map_err(|_| corrupt("instrument", model.id, "negative closing day"))?;
                Funding::Credit {
                    limit,
                    usage,
                    closing_day,
                }
            }
        };

        Ok(Self {
            id: model.id.into(),
            owner_id: model.owner_id.into(),
            card_number: model.card_number,
            brand,
            valid_until: model.valid_until,
            funding,
            version: model.version,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            deleted_at: model.deleted_at.map(|at| at.with_timezone(&Utc)),
        })
    }
}

impl TryFrom<expenses::Model> for Expense {
    type Error = StoreError;

    fn try_from(model: expenses::Model) -> Result<Self, Self::Error> {
        let installments = model
            .installments
            .map(u32::try_from)
            .transpose()
            .map_err(|_| corrupt("expense", model.id, "negative installment count"))?;

        Ok(Self {
            id: model.id.into(),
            owner_id: model.owner_id.into(),
            category_id: model.category_id.into(),
            amount: model.amount,
            date: model.expense_date,
            description: model.description,
            payment_method: model.payment_method,
            installments,
            paid: model.paid,
            instrument_id: model.instrument_id.map(Into::into),
            version: model.version,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            deleted_at: model.deleted_at.map(|at| at.with_timezone(&Utc)),
        })
    }
}

pub(crate) fn category_active_model(category: &Category) -> categories::ActiveModel {
    categories::ActiveModel {
        id: Set(category.id.into_inner()),
        name: Set(category.name.clone()),
        created_at: Set(Utc::now().fixed_offset()),
        deleted_at: Set(category.deleted_at.map(|at| at.fixed_offset())),
    }
}

pub(crate) fn income_active_model(income: &Income) -> incomes::ActiveModel {
    incomes::ActiveModel {
        id: Set(income.id.into_inner()),
        owner_id: Set(income.owner_id.into_inner()),
        amount: Set(income.amount),
        income_date: Set(income.date),
        description: Set(income.description.clone()),
        created_at: Set(Utc::now().fixed_offset()),
        deleted_at: Set(income.deleted_at.map(|at| at.fixed_offset())),
    }
}

pub(crate) fn instrument_active_model(
    instrument: &Instrument,
) -> Result<instruments::ActiveModel, StoreError> {
    let funding = FundingColumns::split(instrument)?;
    Ok(instruments::ActiveModel {
        id: Set(instrument.id.into_inner()),
        owner_id: Set(instrument.owner_id.into_inner()),
        card_number: Set(instrument.card_number.clone()),
        brand: Set(instrument.brand.as_str().to_string()),
        kind: Set(instrument.kind().into()),
        valid_until: Set(instrument.valid_until),
        balance: Set(funding.balance),
        credit_limit: Set(funding.credit_limit),
        credit_usage: Set(funding.credit_usage),
        closing_day: Set(funding.closing_day),
        version: Set(instrument.version),
        created_at: Set(instrument.created_at.fixed_offset()),
        updated_at: Set(instrument.updated_at.fixed_offset()),
        deleted_at: Set(instrument.deleted_at.map(|at| at.fixed_offset())),
    })
}

pub(crate) fn expense_active_model(expense: &Expense) -> Result<expenses::ActiveModel, StoreError> {
    Ok(expenses::ActiveModel {
        id: Set(expense.id.into_inner()),
        owner_id: Set(expense.owner_id.into_inner()),
        category_id: Set(expense.category_id.into_inner()),
        amount: Set(expense.amount),
        expense_date: Set(expense.date),
        description: Set(expense.description.clone()),
        payment_method: Set(expense.payment_method.clone()),
        installments: Set(installments_column(expense)?),
        paid: Set(expense.paid),
        instrument_id: Set(expense.instrument_id.map(|id| id.into_inner())),
        version: Set(expense.version),
        created_at: Set(expense.created_at.fixed_offset()),
        updated_at: Set(expense.updated_at.fixed_offset()),
        deleted_at: Set(expense.deleted_at.map(|at| at.fixed_offset())),
    })
}
