//! Chained-bucket hash index: a pointer-free hash table where both the
//! bucket-head array and the chain-link array are flat arrays of signed
//! integers, `-1` meaning absent. Used as the spine of the
//! [`crate::pool::Pool`] and, standalone, as a general set-of-integers
//! index. Not thread-safe on its own — the caller is expected to serialize
//! access the same way it does for the AVL index's write paths.

use std::hash::{BuildHasher, Hasher};

use crate::{err_at, Result};

mod hasher;
pub use hasher::CityHasher;

/// Sentinel for "no node"/"no next link": every slot is either `-1` or a
/// valid node index, kept as a raw `i32` rather than translated into
/// `Option` at the storage layer so `hash_table` and `link_table` stay
/// flat, allocation-free arrays.
pub const EMPTY: i32 = -1;

/// Counts and sizes gathered by [`HashIndex::stats`], mirrored on the
/// AVL side's own `avl::stats::Stats`.
pub struct Stats {
    pub hash_table_size: usize,
    pub capacity: usize,
    pub new_node_pointer: usize,
    pub element_count: usize,
    pub freelist_len: usize,
    pub max_chain_len: usize,
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "hash = {{ hash_table_size={}, capacity={}, new_node_pointer={}, element_count={}, freelist_len={}, max_chain_len={} }}",
            self.hash_table_size, self.capacity, self.new_node_pointer, self.element_count, self.freelist_len, self.max_chain_len,
        )
    }
}

/// Chained-bucket hash index over `capacity` reclaimable node slots and
/// `hash_table_size` buckets.
pub struct HashIndex {
    hash_table: Vec<i32>,
    link_table: Vec<i32>,
    reclaimed_pointer: i32,
    new_node_pointer: i32,
    element_count: usize,
    capacity: usize,
}

impl HashIndex {
    pub fn new(hash_table_size: usize, capacity: usize) -> HashIndex {
        HashIndex {
            hash_table: vec![EMPTY; hash_table_size],
            link_table: vec![EMPTY; capacity],
            reclaimed_pointer: EMPTY,
            new_node_pointer: 0,
            element_count: 0,
            capacity,
        }
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn new_node_pointer(&self) -> i32 {
        self.new_node_pointer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bucket_for(&self, hash: u64) -> usize {
        (hash % self.hash_table.len() as u64) as usize
    }

    /// `getLookup`: head of `bucket`'s chain, or `None` if empty.
    pub fn get_lookup(&self, bucket: usize) -> Option<i32> {
        match self.hash_table[bucket] {
            EMPTY => None,
            n => Some(n),
        }
    }

    /// `getNextLookup`: the node following `node` in its chain.
    pub fn get_next_lookup(&self, node: i32) -> Option<i32> {
        match self.link_table[node as usize] {
            EMPTY => None,
            n => Some(n),
        }
    }

    /// `linkNode`: allocate a node (from the freelist if non-empty, else by
    /// bumping `new_node_pointer`) and link it into `bucket`'s chain, at the
    /// head if `last_in_chain` is `None`, else immediately after that node.
    pub fn link_node(&mut self, bucket: usize, last_in_chain: Option<i32>) -> Result<i32> {
        let node = if self.reclaimed_pointer != EMPTY {
            let n = self.reclaimed_pointer;
            self.reclaimed_pointer = self.link_table[n as usize];
            n
        } else {
            if self.new_node_pointer as usize >= self.capacity {
                return err_at!(Invariant, msg: "hash index exhausted capacity {}", self.capacity);
            }
            let n = self.new_node_pointer;
            self.new_node_pointer += 1;
            n
        };

        match last_in_chain {
            None => {
                self.link_table[node as usize] = self.hash_table[bucket];
                self.hash_table[bucket] = node;
            }
            Some(prev) => {
                self.link_table[node as usize] = self.link_table[prev as usize];
                self.link_table[prev as usize] = node;
            }
        }
        self.element_count += 1;
        Ok(node)
    }

    /// `unlinkNode`: splice `node` out of `bucket`'s chain and prepend it to
    /// the freelist. If this drains `element_count` to zero the whole index
    /// is wiped back to the state `HashIndex::new` would produce.
    pub fn unlink_node(&mut self, bucket: usize, last_in_chain: Option<i32>, node: i32) {
        let next = self.link_table[node as usize];
        match last_in_chain {
            None => self.hash_table[bucket] = next,
            Some(prev) => self.link_table[prev as usize] = next,
        }
        self.link_table[node as usize] = self.reclaimed_pointer;
        self.reclaimed_pointer = node;
        self.element_count -= 1;

        if self.element_count == 0 {
            for h in self.hash_table.iter_mut() {
                *h = EMPTY;
            }
            for l in self.link_table.iter_mut() {
                *l = EMPTY;
            }
            self.new_node_pointer = 0;
            self.reclaimed_pointer = EMPTY;
        }
    }

    fn remove_from_freelist(&mut self, index: i32) -> Result<()> {
        if self.reclaimed_pointer == index {
            self.reclaimed_pointer = self.link_table[index as usize];
            return Ok(());
        }
        let mut cur = self.reclaimed_pointer;
        while cur != EMPTY {
            let next = self.link_table[cur as usize];
            if next == index {
                self.link_table[cur as usize] = self.link_table[index as usize];
                return Ok(());
            }
            cur = next;
        }
        err_at!(Invariant, msg: "node {} is not a reclaimed (unlinked) slot", index)
    }

    /// `removeEmptyNode`: `index` must already be an unlinked (freelisted)
    /// slot. Drop it from the freelist, then shift every node at a position
    /// greater than `index` down by one, decrementing every stored pointer
    /// greater than `index` to match: freelist order is preserved minus
    /// the removed entry, and every pointer `> index` decrements by one.
    pub fn remove_empty_node(&mut self, index: i32) -> Result<()> {
        self.remove_from_freelist(index)?;

        let idx = index as usize;
        let top = self.new_node_pointer as usize;
        for i in idx..top.saturating_sub(1) {
            self.link_table[i] = self.link_table[i + 1];
        }
        if top > 0 {
            self.link_table[top - 1] = EMPTY;
        }
        self.new_node_pointer -= 1;

        for h in self.hash_table.iter_mut() {
            if *h > index {
                *h -= 1;
            }
        }
        for i in 0..(self.new_node_pointer as usize) {
            if self.link_table[i] > index {
                self.link_table[i] -= 1;
            }
        }
        if self.reclaimed_pointer > index {
            self.reclaimed_pointer -= 1;
        }
        Ok(())
    }

    /// `insertEmptyNode`: inverse of `remove_empty_node`. Shift every node
    /// at position `>= index` up by one, incrementing stored pointers to
    /// match, then push `index` onto the head of the freelist, so the next
    /// `link_node` call returns exactly `index`.
    pub fn insert_empty_node(&mut self, index: i32) -> Result<()> {
        if self.new_node_pointer as usize >= self.capacity {
            return err_at!(Invariant, msg: "hash index exhausted capacity {}", self.capacity);
        }
        let idx = index as usize;
        let top = self.new_node_pointer as usize;
        for i in (idx..top).rev() {
            self.link_table[i + 1] = self.link_table[i];
        }
        self.new_node_pointer += 1;

        for h in self.hash_table.iter_mut() {
            if *h >= index {
                *h += 1;
            }
        }
        for i in 0..(self.new_node_pointer as usize) {
            if i == idx {
                continue;
            }
            if self.link_table[i] >= index {
                self.link_table[i] += 1;
            }
        }
        if self.reclaimed_pointer >= index {
            self.reclaimed_pointer += 1;
        }

        self.link_table[idx] = self.reclaimed_pointer;
        self.reclaimed_pointer = index;
        Ok(())
    }

    pub fn stats(&self) -> Stats {
        let mut freelist_len = 0;
        let mut cur = self.reclaimed_pointer;
        while cur != EMPTY {
            freelist_len += 1;
            cur = self.link_table[cur as usize];
        }

        let mut max_chain_len = 0;
        for &head in &self.hash_table {
            let mut len = 0;
            let mut cur = head;
            while cur != EMPTY {
                len += 1;
                cur = self.link_table[cur as usize];
            }
            max_chain_len = max_chain_len.max(len);
        }

        Stats {
            hash_table_size: self.hash_table.len(),
            capacity: self.capacity,
            new_node_pointer: self.new_node_pointer as usize,
            element_count: self.element_count,
            freelist_len,
            max_chain_len,
        }
    }
}

/// Hash a byte string the same way the value pool hashes string-like keys,
/// via the crate's shared [`CityHasher`].
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut h = CityHasher::new().build_hasher();
    h.write(bytes);
    h.finish()
}

#[cfg(test)]
#[path = "hash_test.rs"]
mod hash_test;
