use super::*;

#[test]
fn test_null_sorts_below_everything() {
    assert_eq!(compare_typed(&Value::Null, &Value::Null), Ordering::Equal);
    assert_eq!(compare_typed(&Value::Null, &Value::Integer(0)), Ordering::Less);
    assert_eq!(compare_typed(&Value::Integer(0), &Value::Null), Ordering::Greater);
}

#[test]
fn test_integer_ordering() {
    assert_eq!(compare_typed(&Value::Integer(1), &Value::Integer(2)), Ordering::Less);
    assert_eq!(compare_typed(&Value::Integer(2), &Value::Integer(2)), Ordering::Equal);
}

#[test]
fn test_double_compares_by_value_not_bits() {
    let a = Value::double(1.5);
    let b = Value::double(2.5);
    assert_eq!(compare_typed(&a, &b), Ordering::Less);
    assert_eq!(a, Value::double(1.5));
}

#[test]
fn test_varchar_ordering() {
    let a = Value::Varchar("apple".to_string());
    let b = Value::Varchar("banana".to_string());
    assert_eq!(compare_typed(&a, &b), Ordering::Less);
}

#[test]
fn test_timestamp_round_trips_through_chrono() {
    let dt = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc();
    let v = Value::timestamp(dt);
    assert_eq!(v.as_timestamp(), Some(dt));
}

#[test]
fn test_value_round_trips_through_serde() {
    let v = Value::Varchar("hello".to_string());
    let encoded = serde_json::to_string(&v).expect("value serializes");
    let decoded: Value = serde_json::from_str(&encoded).expect("value deserializes");
    assert_eq!(v, decoded);
}
