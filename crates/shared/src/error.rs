//! Application-wide error types.
//!
//! Every module error in the workspace converts into [`AppError`], so callers
//! see one typed taxonomy regardless of which layer rejected the request.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced row does not exist, is soft-deleted, or belongs to another owner.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Structurally invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation (budget, limit, balance, statistics input).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Row changed between read and write; the caller may retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence backend failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Unexpected failure with a diagnostic message.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code for responses and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
