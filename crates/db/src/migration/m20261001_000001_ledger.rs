//! Initial ledger schema.
//!
//! Creates users, categories, incomes, instruments and expenses. Money is
//! `NUMERIC(18, 2)`; every ledger table is soft-deleted via `deleted_at`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;
        db.execute_unprepared(INCOMES_SQL).await?;
        db.execute_unprepared(INSTRUMENTS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE instrument_kind AS ENUM ('debit', 'credit');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL CHECK (length(btrim(name)) > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX idx_categories_name_live ON categories (name) WHERE deleted_at IS NULL;
";

const INCOMES_SQL: &str = r"
CREATE TABLE incomes (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id),
    amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    income_date DATE NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_incomes_owner_date ON incomes (owner_id, income_date) WHERE deleted_at IS NULL;
";

const INSTRUMENTS_SQL: &str = r"
CREATE TABLE instruments (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id),
    card_number CHAR(16) NOT NULL CHECK (card_number ~ '^[0-9]{16}$'),
    brand VARCHAR(20) NOT NULL CHECK (brand IN ('Visa', 'MasterCard', 'Amex', 'Discover', 'Elo')),
    kind instrument_kind NOT NULL,
    valid_until DATE NOT NULL,
    balance NUMERIC(18, 2),
    credit_limit NUMERIC(18, 2),
    credit_usage NUMERIC(18, 2),
    closing_day SMALLINT,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ,

    CONSTRAINT chk_instrument_funding CHECK (
        (kind = 'debit'
            AND balance IS NOT NULL AND balance >= 0
            AND credit_limit IS NULL AND credit_usage IS NULL AND closing_day IS NULL)
        OR
        (kind = 'credit'
            AND balance IS NULL
            AND credit_limit IS NOT NULL AND credit_limit >= 0
            AND credit_usage IS NOT NULL AND credit_usage >= 0 AND credit_usage <= credit_limit
            AND closing_day BETWEEN 1 AND 31)
    )
);

-- A card number is unique per owner among live instruments
CREATE UNIQUE INDEX idx_instruments_owner_card_live
    ON instruments (owner_id, card_number) WHERE deleted_at IS NULL;
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id),
    category_id UUID NOT NULL REFERENCES categories(id),
    amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    expense_date DATE NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    payment_method VARCHAR(50) NOT NULL,
    installments INTEGER CHECK (installments IS NULL OR installments >= 1),
    paid BOOLEAN NOT NULL DEFAULT FALSE,
    instrument_id UUID REFERENCES instruments(id),
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_expenses_owner_date ON expenses (owner_id, expense_date) WHERE deleted_at IS NULL;
CREATE INDEX idx_expenses_instrument ON expenses (instrument_id) WHERE instrument_id IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS instruments CASCADE;
DROP TABLE IF EXISTS incomes CASCADE;
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS instrument_kind;
";
