//! Row representation: a tuple of typed column values plus the monotonic
//! position identifier used both as the row's handle in the store and,
//! for non-unique indexes, as the final tie-break in the comparator.

use serde::{Deserialize, Serialize};

use crate::types::Value;

/// A row's position, monotonically assigned by the table on `INSERT`.
/// Doubles as the handle a [`Store`](crate::store::Store) uses to
/// dereference the row and, when a tree needs a total order over
/// otherwise-equal keys, as the row-id tie-break.
pub type RowId = i64;

/// An ordered tuple of typed values plus its row-id. Each row carries one
/// AVL node per index defined over its table; this type only models the
/// payload side — node links live in the [`Store`] alongside it, addressed
/// by `(index position, row id)`.
///
/// [`Store`]: crate::store::Store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<Value>,
    /// `None` means "current" (infinity); `Some(ts)` is the timestamp at
    /// which a system-versioned row stopped being current. Only consulted
    /// by the comparator when the owning [`IndexDescriptor`] is flagged
    /// `system_versioned`.
    ///
    /// [`IndexDescriptor`]: crate::descriptor::IndexDescriptor
    pub system_end_version: Option<i64>,
}

impl Row {
    pub fn new(id: RowId, values: Vec<Value>) -> Row {
        Row {
            id,
            values,
            system_end_version: None,
        }
    }

    pub fn with_end_version(mut self, end_version: Option<i64>) -> Row {
        self.system_end_version = end_version;
        self
    }

    pub fn value_at(&self, column: usize) -> &Value {
        &self.values[column]
    }
}
