//! Payment instruments.
//!
//! A debit card draws on a balance; a credit card charges against a limit
//! and rolls purchases made after its closing day into the next billing
//! cycle. The router applies those rules to an expense draft before it is
//! committed.

pub mod error;
pub mod payment;
pub mod router;
pub mod service;
pub mod types;
pub mod validation;


pub use error::InstrumentError;
pub use payment::{CREDIT_CARD, DEBIT_CARD, PaymentMethod, matches_method};
pub use router::{PaymentInstrumentRouter, RoutedExpense};
pub use service::InstrumentService;
pub use types::{CardBrand, Funding, Instrument, InstrumentKind};
pub use validation::{InstrumentPatch, NewFunding, NewInstrument};
