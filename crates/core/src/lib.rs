//! Core business logic for Spendwise.
//!
//! This crate contains the expense-posting engine and the descriptive
//! statistics over stored expenses. It has ZERO web or database dependencies:
//! persistence is reached only through the [`store::LedgerStore`] port.
//!
//! # Modules
//!
//! - `budget` - Available income per month and the budget check
//! - `instrument` - Debit and credit cards, validation and payment routing
//! - `expense` - Expense rows, drafts and installment expansion
//! - `posting` - A posting transaction run against a ledger store
//! - `statistics` - Descriptive statistics and the statistics report
//! - `store` - Ledger store port and the in-memory implementation
//! - `tombstone` - Soft-delete predicate shared by every read path

pub mod budget;
pub mod expense;
pub mod instrument;
pub mod posting;
pub mod statistics;
pub mod store;
pub mod tombstone;
