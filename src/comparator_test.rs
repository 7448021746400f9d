use super::*;
use crate::descriptor::IndexDescriptorBuilder;
use crate::types::{ColumnType, Value};

fn row(id: i64, values: Vec<Value>) -> Row {
    Row::new(id, values)
}

#[test]
fn test_simple_order_ascending() {
    let desc = IndexDescriptorBuilder::new("ix_a", 0, 1)
        .column(0, ColumnType::Integer, false, false)
        .build();
    let a = row(1, vec![Value::Integer(1)]);
    let b = row(2, vec![Value::Integer(2)]);
    assert_eq!(compare_rows(&desc, &a, &b, false), Ordering::Less);
    assert_eq!(compare_rows(&desc, &b, &a, false), Ordering::Greater);
}

#[test]
fn test_descending_nulls_last_second_column() {
    // two-column index, second column DESC + nulls-last.
    let desc = IndexDescriptorBuilder::new("ix_b", 0, 1)
        .column(0, ColumnType::Integer, false, false)
        .column(1, ColumnType::Integer, true, true)
        .build();

    let r20 = row(1, vec![Value::Integer(1), Value::Integer(20)]);
    let r10 = row(2, vec![Value::Integer(1), Value::Integer(10)]);
    let rnull = row(3, vec![Value::Integer(1), Value::Null]);
    let r2_30 = row(4, vec![Value::Integer(2), Value::Integer(30)]);

    // expected order: (1,20), (1,10), (1,NULL), (2,30)
    assert_eq!(compare_rows(&desc, &r20, &r10, false), Ordering::Less);
    assert_eq!(compare_rows(&desc, &r10, &rnull, false), Ordering::Less);
    assert_eq!(compare_rows(&desc, &rnull, &r2_30, false), Ordering::Less);
}

#[test]
fn test_symmetry() {
    let desc = IndexDescriptorBuilder::new("ix_c", 0, 1)
        .column(0, ColumnType::Integer, true, true)
        .build();
    let a = row(1, vec![Value::Integer(5)]);
    let b = row(2, vec![Value::Null]);
    let fwd = compare_rows(&desc, &a, &b, false);
    let bwd = compare_rows(&desc, &b, &a, false);
    assert_eq!(fwd.reverse(), bwd);
}

#[test]
fn test_equal_values_regardless_of_row_id() {
    let desc = IndexDescriptorBuilder::new("ix_d", 0, 1)
        .column(0, ColumnType::Integer, false, false)
        .build();
    let a = row(1, vec![Value::Integer(7)]);
    let b = row(999, vec![Value::Integer(7)]);
    assert_eq!(compare_rows(&desc, &a, &b, false), Ordering::Equal);
}

#[test]
fn test_row_id_tie_break() {
    let desc = IndexDescriptorBuilder::new("ix_e", 0, 1)
        .column(0, ColumnType::Integer, false, false)
        .build();
    let a = row(1, vec![Value::Integer(7)]);
    let b = row(2, vec![Value::Integer(7)]);
    assert_eq!(compare_rows(&desc, &a, &b, true), Ordering::Less);
}

#[test]
fn test_system_versioned_end_version_tiebreak() {
    let mut desc = IndexDescriptorBuilder::new("ix_f", 0, 1)
        .column(0, ColumnType::Integer, false, false)
        .build();
    desc.system_versioned = true;

    let older = row(5, vec![Value::Integer(1)]).with_end_version(Some(100));
    let newer = row(6, vec![Value::Integer(1)]).with_end_version(Some(200));
    assert_eq!(compare_rows(&desc, &older, &newer, false), Ordering::Less);

    let current_a = row(1, vec![Value::Integer(1)]).with_end_version(None);
    let current_b = row(2, vec![Value::Integer(1)]).with_end_version(None);
    assert_eq!(compare_rows(&desc, &current_a, &current_b, false), Ordering::Equal);
    assert_eq!(compare_rows(&desc, &current_a, &current_b, true), Ordering::Less);
}
