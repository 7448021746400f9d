//! Index descriptor: the immutable shape of an index, built once and
//! shared by handle rather than copied or mutated in place.

use crate::types::ColumnType;

/// An immutable description of one index over one table. Built once at
/// schema-installation time and shared behind an `Arc` from then on. Only
/// `position`, `table` and `is_clustered` are ever touched after
/// construction in the systems this core sits inside, and even those only
/// during schema installation, never concurrently with queries. This
/// crate keeps the descriptor fully immutable and leaves "install a
/// different descriptor" to the caller (rebuild and swap the `Arc`), which
/// is simpler and just as safe.
#[derive(Clone, Debug)]
pub struct IndexDescriptor {
    pub name: String,
    /// Stable position of this index within its table's index array.
    pub position: usize,
    /// Persistence identifier assigned by the store.
    pub persistence_id: u64,
    /// Which columns of the row participate in this index's key, in
    /// order.
    pub column_indexes: Vec<usize>,
    /// Column type of each entry in `column_indexes`, same order.
    pub column_types: Vec<ColumnType>,
    /// Per-column descending flag, same order as `column_indexes`.
    pub descending: Vec<bool>,
    /// Per-column nulls-last flag, same order as `column_indexes`.
    pub nulls_last: Vec<bool>,
    pub is_pk: bool,
    pub is_unique: bool,
    pub is_constraint: bool,
    /// Name of the owning constraint, used in `UNIQUE_VIOLATION` messages
    /// in place of the index's own name when present.
    pub constraint_name: Option<String>,
    pub is_forward: bool,
    pub is_clustered: bool,
    /// Whether the owning table is system-versioned; gates the
    /// end-version tie-break in the comparator.
    pub system_versioned: bool,
    /// Whether a unique index additionally enforces "distinct nulls"
    /// (every null is distinct from every other null, the SQL default)
    /// as opposed to "unique nulls" (at most one null permitted).
    pub unique_nulls: bool,
}

impl IndexDescriptor {
    /// `true` when every column sorts ascending with default (nulls-first)
    /// null placement — the fast path the comparator takes directly to a
    /// raw-sign comparison.
    pub fn is_simple_order(&self) -> bool {
        self.descending.iter().all(|d| !d) && self.nulls_last.iter().all(|n| !n)
    }

    /// `is_simple_order` restricted to single-column indexes.
    pub fn is_simple(&self) -> bool {
        self.is_simple_order() && self.column_indexes.len() == 1
    }

    pub fn key_len(&self) -> usize {
        self.column_indexes.len()
    }

    /// The name to cite in a `UNIQUE_VIOLATION`: the owning constraint's
    /// name if this index enforces one, else the index's own name.
    pub fn violation_name(&self) -> &str {
        self.constraint_name.as_deref().unwrap_or(&self.name)
    }
}

/// Builder for [`IndexDescriptor`], mirroring the "create an index ..."
/// interface a SQL executor invokes above this core. Every column
/// defaults to ascending, nulls-first.
pub struct IndexDescriptorBuilder {
    desc: IndexDescriptor,
}

impl IndexDescriptorBuilder {
    pub fn new(name: impl Into<String>, position: usize, persistence_id: u64) -> Self {
        IndexDescriptorBuilder {
            desc: IndexDescriptor {
                name: name.into(),
                position,
                persistence_id,
                column_indexes: Vec::new(),
                column_types: Vec::new(),
                descending: Vec::new(),
                nulls_last: Vec::new(),
                is_pk: false,
                is_unique: false,
                is_constraint: false,
                constraint_name: None,
                is_forward: false,
                is_clustered: false,
                system_versioned: false,
                unique_nulls: false,
            },
        }
    }

    pub fn column(mut self, index: usize, ty: ColumnType, descending: bool, nulls_last: bool) -> Self {
        self.desc.column_indexes.push(index);
        self.desc.column_types.push(ty);
        self.desc.descending.push(descending);
        self.desc.nulls_last.push(nulls_last);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.desc.is_pk = true;
        self.desc.is_unique = true;
        self
    }

    pub fn unique(mut self, unique_nulls: bool) -> Self {
        self.desc.is_unique = true;
        self.desc.unique_nulls = unique_nulls;
        self
    }

    pub fn constraint(mut self, name: impl Into<String>) -> Self {
        self.desc.is_constraint = true;
        self.desc.constraint_name = Some(name.into());
        self
    }

    pub fn forward(mut self) -> Self {
        self.desc.is_forward = true;
        self
    }

    pub fn clustered(mut self) -> Self {
        self.desc.is_clustered = true;
        self
    }

    pub fn system_versioned(mut self) -> Self {
        self.desc.system_versioned = true;
        self
    }

    pub fn build(self) -> IndexDescriptor {
        self.desc
    }
}
