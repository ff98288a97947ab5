//! Expense rows, posting drafts and installment expansion.

pub mod installment;
pub mod types;

pub use installment::Installments;
pub use types::{Category, Expense, ExpenseDraft, ExpensePatch};
