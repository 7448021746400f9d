//! Typed column values and the column-type tags an [`IndexDescriptor`] uses
//! to pick a per-column ordering.
//!
//! [`IndexDescriptor`]: crate::descriptor::IndexDescriptor

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// SQL-ish column types this core knows how to order. Kept deliberately
/// small: the expression evaluator and data-type conversion machinery own
/// the rest of the type system (spec Out of scope, §1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    BigInt,
    Double,
    Varchar,
    Timestamp,
}

/// A single column value. `Null` is a distinct variant rather than, say,
/// `Option<Value>`, because several code paths (the comparator's
/// nulls-last handling, the value pool's interning) need to special-case
/// it without unwrapping a nested value first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i32),
    BigInt(i64),
    /// Stored as the raw bit pattern so that `Value` can derive `PartialEq`
    /// without running into `f64`'s partial ordering; see [`Value::as_f64`].
    Double(u64),
    Varchar(String),
    /// Seconds since the Unix epoch, the same representation the value
    /// pool's `timestamp-seconds` kind interns. Construct from a
    /// `chrono::NaiveDateTime` with [`Value::timestamp`] rather than
    /// threading raw epoch arithmetic through callers.
    Timestamp(i64),
}

impl Value {
    pub fn double(v: f64) -> Value {
        Value::Double(v.to_bits())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    pub fn timestamp(dt: NaiveDateTime) -> Value {
        Value::Timestamp(dt.and_utc().timestamp())
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(seconds) => chrono::DateTime::from_timestamp(*seconds, 0).map(|dt| dt.naive_utc()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::BigInt(_) => Some(ColumnType::BigInt),
            Value::Double(_) => Some(ColumnType::Double),
            Value::Varchar(_) => Some(ColumnType::Varchar),
            Value::Timestamp(_) => Some(ColumnType::Timestamp),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        compare_typed(self, other) == Ordering::Equal
    }
}

/// Compare two column values of (assumed) matching type. `Null` sorts
/// below every non-null value and equal to another `Null`; callers that
/// need nulls-last semantics apply that on top of this raw comparison.
pub fn compare_typed(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
        (Value::Double(_), Value::Double(_)) => {
            let (a, b) = (a.as_f64().unwrap(), b.as_f64().unwrap());
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::Varchar(a), Value::Varchar(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        // Mismatched non-null types: the planner is responsible for
        // inserting conversions before values reach the index, but we
        // still need a total order so the tree never panics on it.
        (a, b) => discriminant_rank(a).cmp(&discriminant_rank(b)),
    }
}

fn discriminant_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Integer(_) => 1,
        Value::BigInt(_) => 2,
        Value::Double(_) => 3,
        Value::Varchar(_) => 4,
        Value::Timestamp(_) => 5,
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
