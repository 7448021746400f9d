//! Row-to-row comparison honoring per-column direction, nulls placement
//! and, for system-versioned tables, the end-version tie-break.

use std::cmp::Ordering;

use crate::{descriptor::IndexDescriptor, row::Row, types::compare_typed};

/// Compare `a` and `b` under `desc`'s key columns.
///
/// `use_row_id` enables the row-id tie-break used during insert/delete
/// comparison, which lets a non-unique index (or a unique
/// index tolerating an MVCC-invisible duplicate, see
/// [`crate::avl::index::Index::insert`]) impose a total order over keys
/// that otherwise compare equal.
pub fn compare_rows(desc: &IndexDescriptor, a: &Row, b: &Row, use_row_id: bool) -> Ordering {
    for (j, &col) in desc.column_indexes.iter().enumerate() {
        let (av, bv) = (a.value_at(col), b.value_at(col));
        let raw = compare_typed(av, bv);
        if raw == Ordering::Equal {
            continue;
        }
        if desc.is_simple_order() {
            return raw;
        }

        let has_null = av.is_null() || bv.is_null();
        let mut ord = raw;
        if desc.descending[j] && !has_null {
            ord = ord.reverse();
        }
        if desc.nulls_last[j] && has_null {
            ord = ord.reverse();
        }
        return ord;
    }

    // All key columns tied.
    if desc.system_versioned {
        match compare_end_versions(a.system_end_version, b.system_end_version) {
            Ordering::Equal if is_infinity(a.system_end_version) => {
                // fall through to row-id tie-break below
            }
            Ordering::Equal => return Ordering::Equal,
            other => return other,
        }
    }

    if use_row_id {
        a.id.cmp(&b.id)
    } else {
        Ordering::Equal
    }
}

/// Compare only the first `prefix_len` key columns of `desc`, ignoring the
/// system-versioned and row-id tie-breaks. Used by the distinct-prefix hop
/// and by `find_first_row`'s descent, both of which only care about a
/// leading subset of the index's columns.
pub fn compare_prefix(desc: &IndexDescriptor, prefix_len: usize, a: &Row, b: &Row) -> Ordering {
    for (j, &col) in desc.column_indexes.iter().enumerate().take(prefix_len) {
        let (av, bv) = (a.value_at(col), b.value_at(col));
        let raw = compare_typed(av, bv);
        if raw == Ordering::Equal {
            continue;
        }
        if desc.is_simple_order() {
            return raw;
        }
        let has_null = av.is_null() || bv.is_null();
        let mut ord = raw;
        if desc.descending[j] && !has_null {
            ord = ord.reverse();
        }
        if desc.nulls_last[j] && has_null {
            ord = ord.reverse();
        }
        return ord;
    }
    Ordering::Equal
}

fn is_infinity(end_version: Option<i64>) -> bool {
    end_version.is_none()
}

/// `None` (infinity, i.e. the row is still current) sorts after every
/// concrete timestamp.
fn compare_end_versions(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

#[cfg(test)]
#[path = "comparator_test.rs"]
mod comparator_test;
