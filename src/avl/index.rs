//! The AVL index engine: insert, delete, lookup and selectivity probing.
//! Every mutation and traversal goes through the `Store` the caller
//! supplies; the index itself holds nothing but its immutable
//! [`IndexDescriptor`] and [`AvlIndexConfig`] — the root lives in the
//! store's accessor slot, addressed by position rather than owned by the
//! index directly.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::{
    avl::{
        config::AvlIndexConfig,
        iterator::{predecessor, successor, AvlIterator},
        node::AvlNode,
        rotate::{replace_in_parent, rotate_left, rotate_left_right, rotate_right, rotate_right_left},
    },
    comparator::{compare_prefix, compare_rows},
    descriptor::IndexDescriptor,
    err_at,
    row::{Row, RowId},
    session::Session,
    store::{ActionMode, ReadGuard, SearchOp, Store},
    Error, Result,
};

/// Predicate shape `findFirstRow` accepts: the ways a range can open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareType {
    Equal,
    Greater,
    GreaterEqual,
    Smaller,
    SmallerEqual,
    IsNull,
    IsNotNull,
    Max,
}

fn fetch_node<S: Store + ?Sized>(store: &S, idx: usize, id: RowId) -> Result<AvlNode> {
    err_at!(Invariant, store.get_node(idx, id))
}

fn fetch_row<S: Store + ?Sized>(store: &S, id: RowId) -> Result<Arc<Row>> {
    err_at!(Invariant, store.get_row(id, false))
}

/// One AVL index over one table, addressed through a `Store`.
pub struct Index {
    descriptor: Arc<IndexDescriptor>,
    config: AvlIndexConfig,
}

impl Index {
    pub fn new(descriptor: Arc<IndexDescriptor>, config: AvlIndexConfig) -> Index {
        Index { descriptor, config }
    }

    pub fn descriptor(&self) -> &Arc<IndexDescriptor> {
        &self.descriptor
    }

    /// Link `row`'s node for this index into the tree. Fails with
    /// `UniqueViolation` without touching the tree when a visible
    /// duplicate exists under a unique constraint: the leaf position is
    /// chosen only after the uniqueness check passes.
    pub fn insert<S: Store + ?Sized>(&self, store: &S, session: Option<&Session>, row: &Row) -> Result<()> {
        let position = self.descriptor.position;
        let root = store.get_accessor(position);

        let mut cur = match root {
            Some(r) => r,
            None => {
                store.set_node(position, row.id, AvlNode::leaf(None));
                store.set_accessor(position, Some(row.id));
                return Ok(());
            }
        };

        loop {
            let cur_row = fetch_row(store, cur)?;
            let ord = match compare_rows(&self.descriptor, row, &cur_row, false) {
                Ordering::Equal => self.resolve_duplicate(store, session, row, &cur_row, cur)?,
                other => other,
            };
            let left = ord == Ordering::Less;

            let cur_node = fetch_node(store, position, cur)?;
            match cur_node.child(left) {
                Some(next) => cur = next,
                None => {
                    store.set_node(position, row.id, AvlNode::leaf(Some(cur)));
                    let mut parent = cur_node;
                    parent.set_child(left, Some(row.id));
                    store.set_node(position, cur, parent);
                    self.retrace_insert(store, row.id)?;
                    return Ok(());
                }
            }
        }
    }

    /// All key columns of `row` and `cur_row` compared equal. Decide
    /// whether this is a genuine `UNIQUE_VIOLATION` or a tolerated
    /// MVCC-invisible duplicate, and return the tie-break ordering to
    /// continue the descent with.
    fn resolve_duplicate<S: Store + ?Sized>(
        &self,
        store: &S,
        session: Option<&Session>,
        row: &Row,
        cur_row: &Row,
        cur: RowId,
    ) -> Result<Ordering> {
        let has_null = self
            .descriptor
            .column_indexes
            .iter()
            .any(|&c| row.value_at(c).is_null() || cur_row.value_at(c).is_null());
        let enforced = self.descriptor.is_unique && !(has_null && self.descriptor.unique_nulls);

        if enforced && self.any_visible_duplicate(store, session, cur)? {
            return Err(Error::UniqueViolation {
                name: self.descriptor.violation_name().to_string(),
                data: format!("{:?}", row.values),
            });
        }
        if enforced {
            log::warn!(
                "insert: equal-key neighborhood of {} has no visible row, tolerating duplicate under {}",
                cur,
                self.descriptor.name,
            );
        }
        Ok(compare_rows(&self.descriptor, row, cur_row, self.config.use_row_id))
    }

    /// Walk the contiguous run of nodes that compare equal (ignoring row
    /// id) to `start`'s key, asking the store whether any of them is a
    /// current, visible row under `ACTION_DUP`.
    fn any_visible_duplicate<S: Store + ?Sized>(
        &self,
        store: &S,
        session: Option<&Session>,
        start: RowId,
    ) -> Result<bool> {
        let position = self.descriptor.position;
        let start_row = fetch_row(store, start)?;
        let is_dup = |id: RowId| -> Result<bool> {
            let r = fetch_row(store, id)?;
            Ok(compare_rows(&self.descriptor, &r, &start_row, false) == Ordering::Equal)
        };

        if self.visible_dup_at(store, session, start) {
            return Ok(true);
        }

        let mut cur = start;
        while let Some(next) = successor(store, position, cur)? {
            if !is_dup(next)? {
                break;
            }
            if self.visible_dup_at(store, session, next) {
                return Ok(true);
            }
            cur = next;
        }

        let mut cur = start;
        while let Some(prev) = predecessor(store, position, cur)? {
            if !is_dup(prev)? {
                break;
            }
            if self.visible_dup_at(store, session, prev) {
                return Ok(true);
            }
            cur = prev;
        }

        Ok(false)
    }

    fn visible_dup_at<S: Store + ?Sized>(&self, store: &S, session: Option<&Session>, id: RowId) -> bool {
        let current = fetch_row(store, id).map(|r| r.system_end_version.is_none()).unwrap_or(false);
        current && store.can_read(session, id, ActionMode::Dup, Some(&self.descriptor.column_indexes))
    }

    fn retrace_insert<S: Store + ?Sized>(&self, store: &S, leaf: RowId) -> Result<()> {
        let position = self.descriptor.position;
        let mut node_id = leaf;
        loop {
            let node = fetch_node(store, position, node_id)?;
            let parent_id = match node.parent {
                Some(p) => p,
                None => return Ok(()),
            };
            let mut parent = fetch_node(store, position, parent_id)?;
            let is_right = parent.right == Some(node_id);

            if is_right {
                if parent.balance > 0 {
                    let grandparent = parent.parent;
                    let new_root = if node.balance < 0 {
                        rotate_right_left(store, position, parent_id)?
                    } else {
                        rotate_left(store, position, parent_id)?
                    };
                    log::trace!("insert: rotated at {} (right-heavy), new subtree root {}", parent_id, new_root);
                    replace_in_parent(store, position, grandparent, parent_id, new_root)?;
                    return Ok(());
                } else if parent.balance < 0 {
                    parent.balance = 0;
                    store.set_node(position, parent_id, parent);
                    return Ok(());
                } else {
                    parent.balance = 1;
                    store.set_node(position, parent_id, parent);
                    node_id = parent_id;
                }
            } else if parent.balance < 0 {
                let grandparent = parent.parent;
                let new_root = if node.balance > 0 {
                    rotate_left_right(store, position, parent_id)?
                } else {
                    rotate_right(store, position, parent_id)?
                };
                log::trace!("insert: rotated at {} (left-heavy), new subtree root {}", parent_id, new_root);
                replace_in_parent(store, position, grandparent, parent_id, new_root)?;
                return Ok(());
            } else if parent.balance > 0 {
                parent.balance = 0;
                store.set_node(position, parent_id, parent);
                return Ok(());
            } else {
                parent.balance = -1;
                store.set_node(position, parent_id, parent);
                node_id = parent_id;
            }
        }
    }

    /// Unlink `row`'s node from the tree and rebalance, using the
    /// successor-swap variant with the in-order predecessor. `row` is
    /// located by descending with the comparator's configured row-id
    /// tie-break, so this also works against non-unique indexes.
    pub fn delete<S: Store + ?Sized>(&self, store: &S, row: &Row) -> Result<()> {
        let position = self.descriptor.position;
        let mut z = match store.get_accessor(position) {
            Some(r) => r,
            None => return err_at!(Invariant, msg: "delete on empty index {}", self.descriptor.name),
        };
        loop {
            if z == row.id {
                break;
            }
            let z_row = fetch_row(store, z)?;
            let ord = compare_rows(&self.descriptor, row, &z_row, self.config.use_row_id);
            let node = fetch_node(store, position, z)?;
            z = match ord {
                Ordering::Less => err_at!(Invariant, node.left)?,
                Ordering::Greater => err_at!(Invariant, node.right)?,
                Ordering::Equal => break,
            };
        }

        let zn = fetch_node(store, position, z)?;
        if zn.left.is_some() && zn.right.is_some() {
            let y = {
                let mut cur = err_at!(Invariant, zn.left)?;
                loop {
                    let n = fetch_node(store, position, cur)?;
                    match n.right {
                        Some(r) => cur = r,
                        None => break cur,
                    }
                }
            };
            self.swap_for_delete(store, z, y)?;
        }

        let zn = fetch_node(store, position, z)?;
        let child = zn.left.or(zn.right);
        if let Some(c) = child {
            let mut cn = fetch_node(store, position, c)?;
            cn.parent = zn.parent;
            store.set_node(position, c, cn);
        }
        let removed_from_left = zn.parent.map(|p| {
            fetch_node(store, position, p).map(|pn| pn.left == Some(z)).unwrap_or(false)
        });
        match zn.parent {
            None => store.set_accessor(position, child),
            Some(p) => {
                let mut pn = fetch_node(store, position, p)?;
                if pn.left == Some(z) {
                    pn.left = child;
                } else {
                    pn.right = child;
                }
                store.set_node(position, p, pn);
            }
        }
        store.remove_node(position, z);

        if let Some(is_left) = removed_from_left {
            self.retrace_delete(store, zn.parent, is_left)?;
        }
        Ok(())
    }

    /// Physically swap the node at `z` (the row being deleted, with two
    /// children) with the node at `y` (its in-order predecessor, which by
    /// construction has no right child) so that `z` ends up in `y`'s old
    /// slot with at most one child, ready for the ordinary splice below.
    /// Balances move with the position they describe rather than being
    /// swapped verbatim, since `z`'s post-swap shape (a leaf, or a single
    /// left child) is simple enough to compute directly.
    fn swap_for_delete<S: Store + ?Sized>(&self, store: &S, z: RowId, y: RowId) -> Result<()> {
        let position = self.descriptor.position;
        let zn = fetch_node(store, position, z)?;
        let yn = fetch_node(store, position, y)?;

        let z_parent = zn.parent;
        let z_left = zn.left;
        let z_right = err_at!(Invariant, zn.right)?;
        let z_balance = zn.balance;
        let y_parent = yn.parent;
        let y_left = yn.left;

        if z_left == Some(y) {
            let new_z = AvlNode {
                parent: Some(y),
                left: y_left,
                right: None,
                balance: if y_left.is_some() { -1 } else { 0 },
            };
            let new_y = AvlNode {
                parent: z_parent,
                left: Some(z),
                right: Some(z_right),
                balance: z_balance,
            };
            if let Some(yl) = y_left {
                let mut n = fetch_node(store, position, yl)?;
                n.parent = Some(z);
                store.set_node(position, yl, n);
            }
            let mut zr = fetch_node(store, position, z_right)?;
            zr.parent = Some(y);
            store.set_node(position, z_right, zr);

            replace_in_parent(store, position, z_parent, z, y)?;
            store.set_node(position, z, new_z);
            store.set_node(position, y, new_y);
        } else {
            let y_parent = err_at!(Invariant, y_parent)?;
            if let Some(yl) = y_left {
                let mut n = fetch_node(store, position, yl)?;
                n.parent = Some(y_parent);
                store.set_node(position, yl, n);
            }
            let mut yp = fetch_node(store, position, y_parent)?;
            yp.right = y_left;
            store.set_node(position, y_parent, yp);

            let new_z = AvlNode {
                parent: Some(y_parent),
                left: None,
                right: None,
                balance: 0,
            };
            let new_y = AvlNode {
                parent: z_parent,
                left: z_left,
                right: Some(z_right),
                balance: z_balance,
            };
            if let Some(zl) = z_left {
                let mut n = fetch_node(store, position, zl)?;
                n.parent = Some(y);
                store.set_node(position, zl, n);
            }
            let mut zr = fetch_node(store, position, z_right)?;
            zr.parent = Some(y);
            store.set_node(position, z_right, zr);

            replace_in_parent(store, position, z_parent, z, y)?;
            store.set_node(position, z, new_z);
            store.set_node(position, y, new_y);
        }
        Ok(())
    }

    /// Retrace upward from the parent of a spliced-out node, continuing
    /// for as long as a subtree's height keeps shrinking (unlike insert,
    /// which always stops after its first rotation).
    fn retrace_delete<S: Store + ?Sized>(&self, store: &S, mut parent: Option<RowId>, mut is_left: bool) -> Result<()> {
        let position = self.descriptor.position;
        while let Some(p) = parent {
            let mut pnode = fetch_node(store, position, p)?;
            if is_left {
                if pnode.balance > 0 {
                    let sibling = err_at!(Invariant, pnode.right)?;
                    let sibling_node = fetch_node(store, position, sibling)?;
                    let grandparent = pnode.parent;
                    let (new_root, height_decreased) = if sibling_node.balance < 0 {
                        (rotate_right_left(store, position, p)?, true)
                    } else {
                        (rotate_left(store, position, p)?, sibling_node.balance != 0)
                    };
                    replace_in_parent(store, position, grandparent, p, new_root)?;
                    if !height_decreased {
                        return Ok(());
                    }
                    is_left = grandparent
                        .map(|g| fetch_node(store, position, g).map(|n| n.left == Some(new_root)).unwrap_or(false))
                        .unwrap_or(false);
                    parent = grandparent;
                } else if pnode.balance == 0 {
                    pnode.balance = 1;
                    store.set_node(position, p, pnode);
                    return Ok(());
                } else {
                    pnode.balance = 0;
                    store.set_node(position, p, pnode.clone());
                    is_left = pnode
                        .parent
                        .map(|g| fetch_node(store, position, g).map(|n| n.left == Some(p)).unwrap_or(false))
                        .unwrap_or(false);
                    parent = pnode.parent;
                }
            } else if pnode.balance < 0 {
                let sibling = err_at!(Invariant, pnode.left)?;
                let sibling_node = fetch_node(store, position, sibling)?;
                let grandparent = pnode.parent;
                let (new_root, height_decreased) = if sibling_node.balance > 0 {
                    (rotate_left_right(store, position, p)?, true)
                } else {
                    (rotate_right(store, position, p)?, sibling_node.balance != 0)
                };
                replace_in_parent(store, position, grandparent, p, new_root)?;
                if !height_decreased {
                    return Ok(());
                }
                is_left = grandparent
                    .map(|g| fetch_node(store, position, g).map(|n| n.left == Some(new_root)).unwrap_or(false))
                    .unwrap_or(false);
                parent = grandparent;
            } else if pnode.balance == 0 {
                pnode.balance = -1;
                store.set_node(position, p, pnode);
                return Ok(());
            } else {
                pnode.balance = 0;
                store.set_node(position, p, pnode.clone());
                is_left = pnode
                    .parent
                    .map(|g| fetch_node(store, position, g).map(|n| n.left == Some(p)).unwrap_or(false))
                    .unwrap_or(false);
                parent = pnode.parent;
            }
        }
        Ok(())
    }

    /// Seek the first node matching a composite predicate over the
    /// leading `field_count` columns of `row_data`, returning an iterator
    /// positioned to walk forward (or, if `reversed`, backward) from
    /// there.
    pub fn find_first_row<'s, S: Store + ?Sized>(
        &self,
        store: &'s S,
        session: Option<&Session>,
        row_data: &Row,
        field_count: usize,
        compare_type: CompareType,
        reversed: bool,
    ) -> Result<AvlIterator<'s, S>> {
        let _guard = ReadGuard::acquire(store);
        let position = self.descriptor.position;
        let start = match store.get_accessor(position) {
            None => None,
            Some(root) => self.descend_for(store, root, row_data, field_count, compare_type)?,
        };
        Ok(AvlIterator::new(store, session.cloned(), self.descriptor.clone(), start, reversed, 0, false))
    }

    /// Point lookup on the full key: like `find_first_row` with
    /// `CompareType::Equal` over every column, but resolves straight to the
    /// row instead of handing back an iterator, erroring `KeyNotFound`
    /// when no row matches.
    pub fn get<S: Store + ?Sized>(
        &self,
        store: &S,
        session: Option<&Session>,
        row_data: &Row,
    ) -> Result<Arc<Row>> {
        let field_count = self.descriptor.column_indexes.len();
        let mut it = self.find_first_row(store, session, row_data, field_count, CompareType::Equal, false)?;
        if it.next()? {
            let row = it.get_current_row().expect("next() returned true");
            if compare_prefix(&self.descriptor, field_count, &row, row_data) == Ordering::Equal {
                return Ok(row);
            }
        }
        Err(Error::KeyNotFound)
    }

    fn descend_for<S: Store + ?Sized>(
        &self,
        store: &S,
        root: RowId,
        target: &Row,
        field_count: usize,
        compare_type: CompareType,
    ) -> Result<Option<RowId>> {
        let position = self.descriptor.position;
        let want_upper_bound = matches!(compare_type, CompareType::Smaller | CompareType::SmallerEqual | CompareType::Max);
        let mut best: Option<RowId> = None;
        let mut cur = Some(root);

        while let Some(id) = cur {
            let row = fetch_row(store, id)?;
            let node = fetch_node(store, position, id)?;

            let cmp = match compare_type {
                CompareType::IsNull | CompareType::IsNotNull => {
                    let want_null = compare_type == CompareType::IsNull;
                    let col = self.descriptor.column_indexes[field_count.saturating_sub(1)];
                    if row.value_at(col).is_null() == want_null {
                        best = Some(id);
                        cur = if want_upper_bound { node.right } else { node.left };
                        continue;
                    }
                    cur = if row.value_at(col).is_null() { node.right } else { node.left };
                    continue;
                }
                _ => compare_prefix(&self.descriptor, field_count, &row, target),
            };

            let take = match compare_type {
                CompareType::Equal => cmp == Ordering::Equal,
                CompareType::Greater => cmp == Ordering::Greater,
                CompareType::GreaterEqual => cmp != Ordering::Less,
                CompareType::Smaller => cmp == Ordering::Less,
                CompareType::SmallerEqual | CompareType::Max => cmp != Ordering::Greater,
                CompareType::IsNull | CompareType::IsNotNull => unreachable!(),
            };

            if take {
                best = Some(id);
                cur = if want_upper_bound { node.right } else { node.left };
            } else if want_upper_bound {
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        Ok(best)
    }

    /// Full-scan iterator, ascending from the leftmost row (or, reversed,
    /// descending from the rightmost). `distinct_count > 0` yields only
    /// the first row of each run sharing that many leading columns.
    pub fn first_row<'s, S: Store + ?Sized>(
        &self,
        store: &'s S,
        session: Option<&Session>,
        distinct_count: usize,
    ) -> Result<AvlIterator<'s, S>> {
        self.scan(store, session, distinct_count, false)
    }

    pub fn last_row<'s, S: Store + ?Sized>(
        &self,
        store: &'s S,
        session: Option<&Session>,
        distinct_count: usize,
    ) -> Result<AvlIterator<'s, S>> {
        self.scan(store, session, distinct_count, true)
    }

    fn scan<'s, S: Store + ?Sized>(
        &self,
        store: &'s S,
        session: Option<&Session>,
        distinct_count: usize,
        reversed: bool,
    ) -> Result<AvlIterator<'s, S>> {
        let _guard = ReadGuard::acquire(store);
        let position = self.descriptor.position;
        let mut start = store.get_accessor(position);
        while let Some(id) = start {
            let node = fetch_node(store, position, id)?;
            let next = if reversed { node.right } else { node.left };
            match next {
                Some(n) => start = Some(n),
                None => break,
            }
        }
        Ok(AvlIterator::new(store, session.cloned(), self.descriptor.clone(), start, reversed, distinct_count, false))
    }

    pub fn size<S: Store + ?Sized>(&self, store: &S, session: Option<&Session>) -> usize {
        store.element_count(session)
    }

    /// Count of distinct keys: an in-order walk comparing each row against
    /// its predecessor under the comparator, reusing the same successor
    /// stepping `search_cost` and the iterator rely on.
    pub fn element_count_unique<S: Store + ?Sized>(&self, store: &S) -> Result<usize> {
        let position = self.descriptor.position;
        let _guard = ReadGuard::acquire(store);
        let mut cur = store.get_accessor(position);
        while let Some(id) = cur {
            let node = fetch_node(store, position, id)?;
            match node.left {
                Some(l) => cur = Some(l),
                None => break,
            }
        }

        let mut count = 0usize;
        let mut prev: Option<Arc<Row>> = None;
        while let Some(id) = cur {
            let row = fetch_row(store, id)?;
            let distinct = match &prev {
                Some(p) => compare_rows(&self.descriptor, p, &row, false) != Ordering::Equal,
                None => true,
            };
            if distinct {
                count += 1;
            }
            prev = Some(row);
            cur = successor(store, position, id)?;
        }
        Ok(count)
    }

    /// Walk the whole tree checking `|balance| <= 1` and bidirectional
    /// parent/child consistency, recording leaf depths along the way.
    pub fn validate<S: Store + ?Sized>(&self, store: &S) -> Result<crate::avl::stats::Stats> {
        let position = self.descriptor.position;
        let mut stats = crate::avl::stats::Stats::new(&self.descriptor.name);
        let mut depths = crate::avl::depth::Depth::default();

        fn walk<S: Store + ?Sized>(
            store: &S,
            position: usize,
            id: RowId,
            expected_parent: Option<RowId>,
            depth: usize,
            count: &mut usize,
            height: &mut usize,
            depths: &mut crate::avl::depth::Depth,
        ) -> Result<i32> {
            let node = fetch_node(store, position, id)?;
            if node.parent != expected_parent {
                return err_at!(Invariant, msg: "node {} has inconsistent parent link", id);
            }
            *count += 1;
            *height = (*height).max(depth);

            let left_h = match node.left {
                Some(l) => walk(store, position, l, Some(id), depth + 1, count, height, depths)?,
                None => -1,
            };
            let right_h = match node.right {
                Some(r) => walk(store, position, r, Some(id), depth + 1, count, height, depths)?,
                None => -1,
            };
            if node.is_leaf() {
                depths.sample(depth);
            }

            let balance = (right_h - left_h) as i8;
            if balance != node.balance || balance.abs() > 1 {
                return err_at!(Invariant, msg: "node {} balance {} inconsistent with subtree heights", id, node.balance);
            }
            Ok(1 + left_h.max(right_h))
        }

        if let Some(root) = store.get_accessor(position) {
            walk(store, position, root, None, 0, &mut stats.n_count, &mut stats.height, &mut depths)?;
        }
        stats.depths = Some(depths);
        Ok(stats)
    }

    /// Per-leading-column selectivity estimate. Delegates to the store first, since a disk-resident
    /// store may track exact statistics; falls back to the probe walk
    /// when the store has no better answer.
    pub fn search_cost<S: Store + ?Sized>(&self, store: &S, session: Option<&Session>) -> Result<Vec<usize>> {
        let position = self.descriptor.position;
        let col_count = self.descriptor.key_len();
        if let Some(estimate) = store.search_cost(session, position, col_count, SearchOp::Equality) {
            return Ok(vec![estimate; col_count]);
        }

        let _guard = ReadGuard::acquire(store);
        let total = store.element_count(session);
        if total == 0 {
            return Ok(vec![0; col_count]);
        }

        let root = match store.get_accessor(position) {
            Some(r) => r,
            None => return Ok(vec![0; col_count]),
        };

        let mut changes = vec![0usize; col_count];
        let mut depth = 0usize;
        let mut cur = root;
        let mut path = vec![cur];
        while depth < self.config.probe_depth {
            let node = fetch_node(store, position, cur)?;
            match node.left {
                Some(l) => {
                    cur = l;
                    path.push(cur);
                    depth += 1;
                }
                None => break,
            }
        }

        let mut prev_row: Option<Arc<Row>> = None;
        for &id in &path {
            let row = fetch_row(store, id)?;
            if let Some(prev) = &prev_row {
                for (j, &col) in self.descriptor.column_indexes.iter().enumerate() {
                    if prev.value_at(col) != row.value_at(col) {
                        changes[j] += 1;
                    }
                }
            }
            prev_row = Some(row);
        }

        if depth >= self.config.probe_depth {
            // Tree is deeper than the sampled spine: take a leftmost-deep
            // and a rightmost-deep probe and double the measured counters
            // once per extra level each uncovers, estimating the change
            // factor below `probe_depth` without walking the whole subtree.
            for go_left in [true, false] {
                let mut extra = root;
                let mut extra_depth = 0usize;
                loop {
                    let node = fetch_node(store, position, extra)?;
                    let next = if go_left { node.left } else { node.right };
                    match next {
                        Some(n) => {
                            extra = n;
                            extra_depth += 1;
                        }
                        None => break,
                    }
                }
                let doublings = extra_depth.saturating_sub(self.config.probe_depth);
                for c in changes.iter_mut() {
                    *c = (*c).max(1) << doublings.min(16);
                }
            }
        }

        Ok(changes
            .into_iter()
            .map(|c| {
                let estimate = if c == 0 { total } else { total / c.max(1) };
                estimate.max(2)
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
