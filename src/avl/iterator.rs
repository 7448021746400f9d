//! Visibility-aware cursor over an AVL index.
//!
//! Holds the node to visit next, the last row successfully returned,
//! direction, distinct-prefix width and the single-row flag. `next()`
//! walks one step of in-order
//! successor/predecessor (or a distinct-prefix hop) at a time, filtering
//! through the store's `can_read` gate so invisible rows are skipped
//! transparently rather than surfaced to the caller.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::{
    comparator::compare_prefix,
    descriptor::IndexDescriptor,
    err_at,
    avl::node::AvlNode,
    row::{Row, RowId},
    session::Session,
    store::{ActionMode, ReadGuard, Store},
    Result,
};

fn fetch_node<S: Store + ?Sized>(store: &S, idx: usize, id: RowId) -> Result<AvlNode> {
    err_at!(Invariant, store.get_node(idx, id))
}

fn fetch_row<S: Store + ?Sized>(store: &S, id: RowId) -> Result<Arc<Row>> {
    err_at!(Invariant, store.get_row(id, false))
}

/// In-order successor: descend leftmost from the right child, or ascend
/// while arriving from the right.
pub(crate) fn successor<S: Store + ?Sized>(store: &S, idx: usize, id: RowId) -> Result<Option<RowId>> {
    let node = fetch_node(store, idx, id)?;
    if let Some(r) = node.right {
        let mut cur = r;
        loop {
            let n = fetch_node(store, idx, cur)?;
            match n.left {
                Some(l) => cur = l,
                None => return Ok(Some(cur)),
            }
        }
    }
    let mut child = id;
    let mut parent = node.parent;
    while let Some(p) = parent {
        let pn = fetch_node(store, idx, p)?;
        if pn.left == Some(child) {
            return Ok(Some(p));
        }
        child = p;
        parent = pn.parent;
    }
    Ok(None)
}

/// Mirror of [`successor`].
pub(crate) fn predecessor<S: Store + ?Sized>(store: &S, idx: usize, id: RowId) -> Result<Option<RowId>> {
    let node = fetch_node(store, idx, id)?;
    if let Some(l) = node.left {
        let mut cur = l;
        loop {
            let n = fetch_node(store, idx, cur)?;
            match n.right {
                Some(r) => cur = r,
                None => return Ok(Some(cur)),
            }
        }
    }
    let mut child = id;
    let mut parent = node.parent;
    while let Some(p) = parent {
        let pn = fetch_node(store, idx, p)?;
        if pn.right == Some(child) {
            return Ok(Some(p));
        }
        child = p;
        parent = pn.parent;
    }
    Ok(None)
}

/// Smallest node whose first `distinct_count` columns are strictly greater
/// than `from`'s, found by a fresh root-to-leaf descent rather than a walk
/// through `from`'s ancestors: a binary descent that compares against
/// `from`'s data and collects the leftmost greater candidate. Reversed
/// cursors hop to the largest strictly-smaller node instead.
fn distinct_hop<S: Store + ?Sized>(
    store: &S,
    desc: &IndexDescriptor,
    distinct_count: usize,
    from: &Row,
    reversed: bool,
) -> Result<Option<RowId>> {
    let root = match store.get_accessor(desc.position) {
        Some(r) => r,
        None => return Ok(None),
    };
    let mut best: Option<RowId> = None;
    let mut cur = Some(root);
    while let Some(id) = cur {
        let row = fetch_row(store, id)?;
        let node = fetch_node(store, desc.position, id)?;
        let cmp = compare_prefix(desc, distinct_count, &row, from);
        if reversed {
            if cmp == Ordering::Less {
                best = Some(id);
                cur = node.right;
            } else {
                cur = node.left;
            }
        } else if cmp == Ordering::Greater {
            best = Some(id);
            cur = node.left;
        } else {
            cur = node.right;
        }
    }
    Ok(best)
}

/// A stateful cursor over visible rows of one index. `'s` ties the cursor
/// to the `Store` it was built against; it never owns the store.
pub struct AvlIterator<'s, S: Store + ?Sized> {
    store: &'s S,
    session: Option<Session>,
    descriptor: Arc<IndexDescriptor>,
    next_node: Option<RowId>,
    last_row: Option<Arc<Row>>,
    reversed: bool,
    distinct_count: usize,
    single: bool,
}

impl<'s, S: Store + ?Sized> AvlIterator<'s, S> {
    pub(crate) fn new(
        store: &'s S,
        session: Option<Session>,
        descriptor: Arc<IndexDescriptor>,
        start: Option<RowId>,
        reversed: bool,
        distinct_count: usize,
        single: bool,
    ) -> Self {
        AvlIterator {
            store,
            session,
            descriptor,
            next_node: start,
            last_row: None,
            reversed,
            distinct_count,
            single,
        }
    }

    /// Advance to the next visible row. Returns `false` once the cursor is
    /// exhausted, or once the session's cooperative-cancellation flag is
    /// set; `get_current_row` keeps returning the last row reached by a
    /// successful call. Each step re-acquires the store's read lock rather
    /// than holding it across the whole scan, matching `find_first_row`'s
    /// per-walk `ReadGuard`.
    pub fn next(&mut self) -> Result<bool> {
        loop {
            if let Some(s) = &self.session {
                if s.is_interrupted() {
                    self.next_node = None;
                    return Ok(false);
                }
            }

            let candidate = match self.next_node {
                Some(id) => id,
                None => return Ok(false),
            };

            let _guard = ReadGuard::acquire(self.store);

            let row = fetch_row(self.store, candidate)?;
            let visible = match &self.session {
                Some(s) => self.store.can_read(Some(s), candidate, ActionMode::Read, None),
                None => true,
            };

            self.next_node = if self.distinct_count > 0 {
                distinct_hop(self.store, &self.descriptor, self.distinct_count, &row, self.reversed)?
            } else if self.reversed {
                predecessor(self.store, self.descriptor.position, candidate)?
            } else {
                successor(self.store, self.descriptor.position, candidate)?
            };

            if visible {
                self.last_row = Some(row);
                if self.single {
                    self.next_node = None;
                }
                return Ok(true);
            }
        }
    }

    pub fn get_current_row(&self) -> Option<Arc<Row>> {
        self.last_row.clone()
    }

    /// Logically delete the row the cursor is currently positioned on.
    /// Physically unlinking the node from every index of the row's table
    /// is the caller's responsibility, via `Index::delete`
    /// — the iterator only has a handle to one index's store.
    pub fn remove_current(&self) {
        if let Some(row) = &self.last_row {
            self.store.delete(self.session.as_ref(), row.id);
        }
    }
}
