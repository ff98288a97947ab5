use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = ExpenseId::new();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = InstrumentId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
    assert_eq!(InstrumentId::from(uuid), id);
}

#[test]
fn test_typed_id_new_is_unique() {
    assert_ne!(ExpenseId::new(), ExpenseId::new());
}

#[test]
fn test_typed_id_parse_roundtrip() {
    let id = CategoryId::new();
    let parsed = CategoryId::from_str(&id.to_string()).unwrap();
    assert_eq!(parsed, id);

    assert!(UserId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&IncomeId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
