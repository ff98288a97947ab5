//! `SeaORM` entity definitions.
//!
//! Every ledger table carries a nullable `deleted_at`. Queries start from
//! [`Tombstoned::live`] so soft-deleted rows never reach the engine.

pub mod categories;
pub mod expenses;
pub mod incomes;
pub mod instruments;
pub mod sea_orm_active_enums;
pub mod users;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

/// An entity whose rows are soft-deleted through a `deleted_at` column.
pub trait Tombstoned: EntityTrait {
    /// The soft-delete timestamp column.
    fn deleted_at_column() -> Self::Column;

    /// Selects rows that have not been soft-deleted.
    fn live() -> Select<Self> {
        Self::find().filter(Self::deleted_at_column().is_null())
    }
}

impl Tombstoned for categories::Entity {
    fn deleted_at_column() -> Self::Column {
        categories::Column::DeletedAt
    }
}

impl Tombstoned for incomes::Entity {
    fn deleted_at_column() -> Self::Column {
        incomes::Column::DeletedAt
    }
}

impl Tombstoned for instruments::Entity {
    fn deleted_at_column() -> Self::Column {
        instruments::Column::DeletedAt
    }
}

impl Tombstoned for expenses::Entity {
    fn deleted_at_column() -> Self::Column {
        expenses::Column::DeletedAt
    }
}
