//! Expense posting against a ledger store.

pub mod error;
pub mod service;


pub use crate::store::Posting;
pub use error::PostingError;
pub use service::PostingService;
