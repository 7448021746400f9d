//! An in-memory [`Store`] implementation: reference/test scaffolding so the
//! AVL engine has something concrete and property-testable to run against
//! (no disk-resident `Store` ships in this crate; a caller supplies one of
//! those separately).
//!
//! Locking is intentionally light: `read_lock`/`write_lock` are bookkeeping
//! only (there's no other thread in the test/demo scenarios this type is
//! built for), while the actual row/node storage sits behind a
//! [`std::sync::Mutex`] for interior mutability. A real disk-resident store
//! would instead hold `util::Spinlock`'s RAII guard across the whole
//! read/write section; `MemoryStore` can't do that and still offer the
//! explicit `lock()`/`unlock()` pairs the `Store` trait's contract
//! specifies, since a guard can't outlive the call that acquired it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    avl::node::AvlNode,
    row::{Row, RowId},
    session::Session,
    store::{ActionMode, SearchOp, Store},
};

type VisibilityFn = dyn Fn(Option<&Session>, RowId, ActionMode, Option<&[usize]>) -> bool + Send + Sync;

struct State {
    rows: HashMap<RowId, Arc<Row>>,
    nodes: Vec<HashMap<RowId, AvlNode>>,
    roots: Vec<Option<RowId>>,
}

pub struct MemoryStore {
    state: Mutex<State>,
    read_locks: AtomicUsize,
    write_locked: AtomicBool,
    version: AtomicI64,
    visibility: Box<VisibilityFn>,
}

impl MemoryStore {
    /// Every row visible to every session (`ActionMode::Read`/`Ref`
    /// included) — the right default for single-session property tests
    /// that don't exercise MVCC.
    pub fn new(num_indexes: usize) -> MemoryStore {
        MemoryStore::with_visibility(num_indexes, |_, _, _, _| true)
    }

    /// Build with a custom visibility policy, e.g. a session-epoch based
    /// one for exercising an MVCC unique-violation sequence end to end.
    pub fn with_visibility<F>(num_indexes: usize, visibility: F) -> MemoryStore
    where
        F: Fn(Option<&Session>, RowId, ActionMode, Option<&[usize]>) -> bool + Send + Sync + 'static,
    {
        MemoryStore {
            state: Mutex::new(State {
                rows: HashMap::new(),
                nodes: (0..num_indexes).map(|_| HashMap::new()).collect(),
                roots: vec![None; num_indexes],
            }),
            read_locks: AtomicUsize::new(0),
            write_locked: AtomicBool::new(false),
            version: AtomicI64::new(0),
            visibility: Box::new(visibility),
        }
    }

    pub fn put_row(&self, row: Row) {
        let mut st = self.state.lock().unwrap();
        st.rows.insert(row.id, Arc::new(row));
    }

    pub fn get_row_direct(&self, row_id: RowId) -> Option<Arc<Row>> {
        self.state.lock().unwrap().rows.get(&row_id).cloned()
    }

    /// Monotonic counter used to stamp `system_end_version` on logical
    /// deletes, standing in for a real commit timestamp.
    pub fn next_version(&self) -> i64 {
        self.version.fetch_add(1, Ordering::SeqCst)
    }
}

impl Store for MemoryStore {
    fn get_row(&self, row_id: RowId, _keep: bool) -> Option<Arc<Row>> {
        self.state.lock().unwrap().rows.get(&row_id).cloned()
    }

    fn keep_in_memory(&self, _row_id: RowId, _keep: bool) {}

    fn get_node(&self, index_position: usize, row_id: RowId) -> Option<AvlNode> {
        self.state.lock().unwrap().nodes[index_position].get(&row_id).copied()
    }

    fn set_node(&self, index_position: usize, row_id: RowId, node: AvlNode) {
        self.state.lock().unwrap().nodes[index_position].insert(row_id, node);
    }

    fn remove_node(&self, index_position: usize, row_id: RowId) {
        self.state.lock().unwrap().nodes[index_position].remove(&row_id);
    }

    fn get_accessor(&self, index_position: usize) -> Option<RowId> {
        self.state.lock().unwrap().roots[index_position]
    }

    fn set_accessor(&self, index_position: usize, root: Option<RowId>) {
        self.state.lock().unwrap().roots[index_position] = root;
    }

    fn delete(&self, _session: Option<&Session>, row_id: RowId) {
        let version = self.next_version();
        let mut st = self.state.lock().unwrap();
        if let Some(row) = st.rows.get(&row_id).cloned() {
            st.rows.insert(row_id, Arc::new((*row).clone().with_end_version(Some(version))));
        }
    }

    fn remove(&self, row_id: RowId) {
        self.state.lock().unwrap().rows.remove(&row_id);
    }

    fn can_read(
        &self,
        session: Option<&Session>,
        row_id: RowId,
        action: ActionMode,
        col_map: Option<&[usize]>,
    ) -> bool {
        (self.visibility)(session, row_id, action, col_map)
    }

    fn read_lock(&self) {
        self.read_locks.fetch_add(1, Ordering::SeqCst);
    }

    fn read_unlock(&self) {
        self.read_locks.fetch_sub(1, Ordering::SeqCst);
    }

    fn write_lock(&self) {
        self.write_locked.store(true, Ordering::SeqCst);
    }

    fn write_unlock(&self) {
        self.write_locked.store(false, Ordering::SeqCst);
    }

    fn element_count(&self, session: Option<&Session>) -> usize {
        let st = self.state.lock().unwrap();
        st.rows
            .keys()
            .filter(|&&id| (self.visibility)(session, id, ActionMode::Read, None))
            .count()
    }

    fn search_cost(
        &self,
        _session: Option<&Session>,
        _index_position: usize,
        _col_count: usize,
        _op: SearchOp,
    ) -> Option<usize> {
        None
    }
}
