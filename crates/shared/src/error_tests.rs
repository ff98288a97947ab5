use super::*;
use rstest::rstest;

#[rstest]
#[case(AppError::NotFound("test".into()), "NOT_FOUND")]
#[case(AppError::Validation("test".into()), "VALIDATION_ERROR")]
#[case(AppError::BusinessRule("test".into()), "BUSINESS_RULE_VIOLATION")]
#[case(AppError::Conflict("test".into()), "CONFLICT")]
#[case(AppError::Database("test".into()), "DATABASE_ERROR")]
#[case(AppError::Internal("test".into()), "INTERNAL_ERROR")]
fn test_app_error_error_codes(#[case] error: AppError, #[case] code: &str) {
    assert_eq!(error.error_code(), code);
}

#[rstest]
#[case(AppError::NotFound("msg".into()), "Not found: msg")]
#[case(AppError::Validation("msg".into()), "Validation error: msg")]
#[case(AppError::BusinessRule("msg".into()), "Business rule violation: msg")]
#[case(AppError::Conflict("msg".into()), "Conflict: msg")]
#[case(AppError::Database("msg".into()), "Database error: msg")]
#[case(AppError::Internal("msg".into()), "Internal error: msg")]
fn test_app_error_display(#[case] error: AppError, #[case] rendered: &str) {
    assert_eq!(error.to_string(), rendered);
}

#[test]
fn test_only_conflicts_are_retryable() {
    assert!(AppError::Conflict("instrument".into()).is_retryable());
    assert!(!AppError::NotFound("instrument".into()).is_retryable());
    assert!(!AppError::BusinessRule("limit".into()).is_retryable());
    assert!(!AppError::Internal("boom".into()).is_retryable());
}
