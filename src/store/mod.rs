//! The persistent-store contract the AVL index is written against.
//! The index never owns rows or node links directly —
//! every dereference goes through a `Store`, so the same index code walks
//! an in-memory row cache or, behind a different `Store` impl, a
//! disk-backed one.

use crate::{avl::node::AvlNode, row::{Row, RowId}, session::Session};
use std::sync::Arc;

pub mod memory;

/// Governs how strict `Store::can_read` is. `Read` filters rows during a
/// scan; `Ref` is a foreign-key parent lookup; `Dup` is the uniqueness
/// neighborhood probe an `insert` runs against a unique index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionMode {
    Read,
    Ref,
    Dup,
}

/// What kind of selectivity estimate `Store::search_cost` (and the
/// index's own `search_cost`, which delegates row-count context to the
/// store) is being asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOp {
    Equality,
    Range,
}

/// The persistence contract consumed by the AVL index. All
/// methods take `&self`: interior mutability (locking, dirty-tracking,
/// caching) is the implementor's concern, so a single writer can serialize
/// mutation internally (e.g. via its own mutex) without the trait forcing
/// `&mut self` on every caller.
pub trait Store {
    /// Dereference a row by id. `keep = true` pins it in memory until a
    /// matching `keep_in_memory(row_id, false)` call; a `Store` that has
    /// no cache eviction policy (like `MemoryStore`) may treat this as a
    /// no-op.
    fn get_row(&self, row_id: RowId, keep: bool) -> Option<Arc<Row>>;

    fn keep_in_memory(&self, row_id: RowId, keep: bool);

    /// Fetch this row's AVL node (links + balance) within the given
    /// index. `None` means the row has no node in this index yet.
    fn get_node(&self, index_position: usize, row_id: RowId) -> Option<AvlNode>;

    /// Persist a mutated node. Disk-resident implementations mark the
    /// backing page dirty here; `MemoryStore` just overwrites its arena
    /// slot.
    fn set_node(&self, index_position: usize, row_id: RowId, node: AvlNode);

    /// Drop a row's node from an index entirely (used once a deleted
    /// row's node has been unlinked and rebalanced away).
    fn remove_node(&self, index_position: usize, row_id: RowId);

    fn get_accessor(&self, index_position: usize) -> Option<RowId>;

    fn set_accessor(&self, index_position: usize, root: Option<RowId>);

    /// Mark a row deleted under the given session and release whatever
    /// cache resources it was holding.
    fn delete(&self, session: Option<&Session>, row_id: RowId);

    /// Unconditionally release a row's cache resources (no MVCC bookkeeping).
    fn remove(&self, row_id: RowId);

    /// MVCC visibility gate: can `session` observe `row_id` under `action`?
    /// `col_map`, when present, restricts the check to the listed columns
    /// (used by foreign-key `Ref` lookups that only care about the
    /// referenced columns' visibility).
    fn can_read(
        &self,
        session: Option<&Session>,
        row_id: RowId,
        action: ActionMode,
        col_map: Option<&[usize]>,
    ) -> bool;

    fn read_lock(&self);
    fn read_unlock(&self);
    fn write_lock(&self);
    fn write_unlock(&self);

    /// Number of rows visible to `session`.
    fn element_count(&self, session: Option<&Session>) -> usize;

    /// Per-column selectivity estimate feeding the index's own
    /// `search_cost`; a `Store` with no better information can deregate
    /// entirely to the index's probe-based estimate and return `None`.
    fn search_cost(
        &self,
        session: Option<&Session>,
        index_position: usize,
        col_count: usize,
        op: SearchOp,
    ) -> Option<usize>;
}

/// RAII wrapper pairing a `Store`'s explicit `read_lock`/`read_unlock`
/// calls with Rust's `Drop`, so index read-paths never forget to release
/// the latch on an early return: indexes take the read lock for the
/// subtree walk and release it before returning the iterator's first row.
pub(crate) struct ReadGuard<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> ReadGuard<'s, S> {
    pub(crate) fn acquire(store: &'s S) -> ReadGuard<'s, S> {
        store.read_lock();
        ReadGuard { store }
    }
}

impl<'s, S: Store + ?Sized> Drop for ReadGuard<'s, S> {
    fn drop(&mut self) {
        self.store.read_unlock();
    }
}
