//! Descriptive statistics over stored expenses.
//!
//! Read-only. [`StatisticsEngine`] holds the pure numeric functions;
//! [`StatisticsService`] loads an owner's live rows and builds a
//! [`StatisticsReport`].

pub mod engine;
pub mod error;
pub mod report;

#[cfg(test)]
mod tests;

pub use engine::{ConfidenceInterval, StatisticsEngine, Z_95};
pub use error::StatisticsError;
pub use report::{ReportOptions, StatisticsReport, StatisticsService};
