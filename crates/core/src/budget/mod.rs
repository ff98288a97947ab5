//! Monthly budget: available income and the posting budget check.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::BudgetError;
pub use service::BudgetLedger;
pub use types::{BudgetPeriod, BudgetSnapshot, Income};
