//! Repository implementations.

mod ledger;
mod mapping;

pub use ledger::SeaLedgerStore;
