//! AVL rotations, performed through a [`Store`] so that a disk-resident
//! implementation can mark the touched pages dirty exactly where the
//! links actually change: every mutation goes through a `set`-style helper
//! that writes back via the store rather than an owned reference.
//!
//! Single rotations use the textbook balance-update formula generalized
//! to cover both the insert case (the rotating child's balance is never
//! zero) and the delete case (it can be). The double rotations are
//! written out directly against the classical formula keyed on the
//! middle node's pre-rotation balance, rather than composed from two
//! single rotations — composing them does not reproduce the textbook
//! balances when the middle node's balance is zero, which only arises on
//! the delete path.

use crate::{avl::node::AvlNode, err_at, row::RowId, store::Store, Result};

fn fetch<S: Store + ?Sized>(store: &S, idx: usize, id: RowId) -> Result<AvlNode> {
    err_at!(Invariant, store.get_node(idx, id))
}

fn reparent<S: Store + ?Sized>(store: &S, idx: usize, child: Option<RowId>, parent: RowId) -> Result<()> {
    if let Some(child_id) = child {
        let mut node = fetch(store, idx, child_id)?;
        node.parent = Some(parent);
        store.set_node(idx, child_id, node);
    }
    Ok(())
}

/// Rotate left around `x`. Returns the new subtree root (`x`'s old right
/// child). Valid whenever `x.right` is populated, whether `x` is
/// genuinely right-heavy (insert/delete single-rotation case) or this is
/// being used as a step of a larger restructuring.
pub(crate) fn rotate_left<S: Store + ?Sized>(store: &S, idx: usize, x: RowId) -> Result<RowId> {
    let mut xn = fetch(store, idx, x)?;
    let y = err_at!(Invariant, xn.right)?;
    let mut yn = fetch(store, idx, y)?;

    let t2 = yn.left;
    xn.right = t2;
    reparent(store, idx, t2, x)?;

    yn.left = Some(x);
    yn.parent = xn.parent;
    xn.parent = Some(y);

    if yn.balance == 0 {
        xn.balance = 1;
        yn.balance = -1;
    } else {
        xn.balance = 0;
        yn.balance = 0;
    }

    store.set_node(idx, x, xn);
    store.set_node(idx, y, yn);
    Ok(y)
}

/// Mirror of [`rotate_left`].
pub(crate) fn rotate_right<S: Store + ?Sized>(store: &S, idx: usize, x: RowId) -> Result<RowId> {
    let mut xn = fetch(store, idx, x)?;
    let y = err_at!(Invariant, xn.left)?;
    let mut yn = fetch(store, idx, y)?;

    let t2 = yn.right;
    xn.left = t2;
    reparent(store, idx, t2, x)?;

    yn.right = Some(x);
    yn.parent = xn.parent;
    xn.parent = Some(y);

    if yn.balance == 0 {
        xn.balance = -1;
        yn.balance = 1;
    } else {
        xn.balance = 0;
        yn.balance = 0;
    }

    store.set_node(idx, x, xn);
    store.set_node(idx, y, yn);
    Ok(y)
}

/// Double rotation for a right-heavy `x` whose right child `z` is
/// left-heavy: right-rotate around `z`, then left-rotate around `x`,
/// expressed as direct pointer surgery so the balance update follows the
/// textbook formula keyed on `y = z.left`'s balance *before* either half
/// of the rotation runs.
pub(crate) fn rotate_right_left<S: Store + ?Sized>(store: &S, idx: usize, x: RowId) -> Result<RowId> {
    let mut xn = fetch(store, idx, x)?;
    let z = err_at!(Invariant, xn.right)?;
    let mut zn = fetch(store, idx, z)?;
    let y = err_at!(Invariant, zn.left)?;
    let mut yn = fetch(store, idx, y)?;

    let y_balance = yn.balance;
    let t2 = yn.left;
    let t3 = yn.right;
    let x_parent = xn.parent;

    xn.right = t2;
    reparent(store, idx, t2, x)?;
    zn.left = t3;
    reparent(store, idx, t3, z)?;

    yn.left = Some(x);
    yn.right = Some(z);
    xn.parent = Some(y);
    zn.parent = Some(y);
    yn.parent = x_parent;

    match y_balance {
        0 => {
            xn.balance = 0;
            zn.balance = 0;
        }
        b if b > 0 => {
            xn.balance = -1;
            zn.balance = 0;
        }
        _ => {
            xn.balance = 0;
            zn.balance = 1;
        }
    }
    yn.balance = 0;

    store.set_node(idx, x, xn);
    store.set_node(idx, z, zn);
    store.set_node(idx, y, yn);
    Ok(y)
}

/// Mirror of [`rotate_right_left`]: left-heavy `x` whose left child `z`
/// is right-heavy.
pub(crate) fn rotate_left_right<S: Store + ?Sized>(store: &S, idx: usize, x: RowId) -> Result<RowId> {
    let mut xn = fetch(store, idx, x)?;
    let z = err_at!(Invariant, xn.left)?;
    let mut zn = fetch(store, idx, z)?;
    let y = err_at!(Invariant, zn.right)?;
    let mut yn = fetch(store, idx, y)?;

    let y_balance = yn.balance;
    let t2 = yn.left;
    let t3 = yn.right;
    let x_parent = xn.parent;

    zn.right = t2;
    reparent(store, idx, t2, z)?;
    xn.left = t3;
    reparent(store, idx, t3, x)?;

    yn.left = Some(z);
    yn.right = Some(x);
    zn.parent = Some(y);
    xn.parent = Some(y);
    yn.parent = x_parent;

    match y_balance {
        0 => {
            xn.balance = 0;
            zn.balance = 0;
        }
        b if b < 0 => {
            xn.balance = 1;
            zn.balance = 0;
        }
        _ => {
            xn.balance = 0;
            zn.balance = -1;
        }
    }
    yn.balance = 0;

    store.set_node(idx, x, xn);
    store.set_node(idx, z, zn);
    store.set_node(idx, y, yn);
    Ok(y)
}

/// Update `old_child`'s slot in `parent` to point at `new_child`, or, when
/// `parent` is `None`, write the index's root accessor instead.
pub(crate) fn replace_in_parent<S: Store + ?Sized>(
    store: &S,
    idx: usize,
    parent: Option<RowId>,
    old_child: RowId,
    new_child: RowId,
) -> Result<()> {
    match parent {
        None => store.set_accessor(idx, Some(new_child)),
        Some(p) => {
            let mut pn = fetch(store, idx, p)?;
            if pn.left == Some(old_child) {
                pn.left = Some(new_child);
            } else if pn.right == Some(old_child) {
                pn.right = Some(new_child);
            } else {
                return err_at!(Invariant, msg: "node {} is not a child of {}", old_child, p);
            }
            store.set_node(idx, p, pn);
        }
    }
    Ok(())
}
