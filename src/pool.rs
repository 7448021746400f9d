//! Value pool: interning of boxed literals over the chained-bucket hash
//! index. Each supported kind gets its own bucket of the same
//! [`HashIndex`], and the pool keeps per-node access counters and a purge
//! policy so a long-lived session doesn't grow the interned set without
//! bound.
//!
//! Sortedness of integer-like chains is the pool's own responsibility, not
//! the hash index's: the hash index itself never orders a chain, it only
//! links/unlinks at given positions.

use std::hash::{BuildHasher, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::hash::{CityHasher, HashIndex};
use crate::util::Spinlock;

/// One interned value plus the access counter the purge policy reads.
enum Entry {
    Integer(Arc<i32>, AtomicU32),
    BigInt(Arc<i64>, AtomicU32),
    Double(Arc<u64>, AtomicU32),
    Varchar(Arc<String>, AtomicU32),
    Substring(Arc<str>, AtomicU32),
    TimestampSeconds(Arc<i64>, AtomicU32),
}

impl Entry {
    fn bump(&self) {
        let counter = match self {
            Entry::Integer(_, c)
            | Entry::BigInt(_, c)
            | Entry::Double(_, c)
            | Entry::Varchar(_, c)
            | Entry::Substring(_, c)
            | Entry::TimestampSeconds(_, c) => c,
        };
        // Saturate rather than wrap: a counter stuck at u32::MAX simply
        // looks maximally "hot" to the purge policy, which is the safe
        // failure mode for an overflow that will essentially never happen.
        counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_add(1))).ok();
    }

    fn count(&self) -> u32 {
        match self {
            Entry::Integer(_, c)
            | Entry::BigInt(_, c)
            | Entry::Double(_, c)
            | Entry::Varchar(_, c)
            | Entry::Substring(_, c)
            | Entry::TimestampSeconds(_, c) => c.load(Ordering::Relaxed),
        }
    }

    fn halve_count(&self) {
        let counter = match self {
            Entry::Integer(_, c)
            | Entry::BigInt(_, c)
            | Entry::Double(_, c)
            | Entry::Varchar(_, c)
            | Entry::Substring(_, c)
            | Entry::TimestampSeconds(_, c) => c,
        };
        counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v / 2)).ok();
    }
}

struct State {
    index: HashIndex,
    entries: Vec<Option<Entry>>,
}

/// Interns boxed scalar values so equal literals (constant-folded SQL
/// expressions, repeated parameter values) share one allocation. Capacity
/// is fixed at construction; once `element_count` reaches `threshold` a
/// `reset()` purges the coldest half of entries and rescales the survivors
/// before the triggering insert retries.
pub struct Pool {
    state: Spinlock<State>,
    hash_table_size: usize,
    capacity: usize,
    threshold: usize,
}

impl Pool {
    pub fn new(hash_table_size: usize, capacity: usize) -> Pool {
        Pool::with_threshold(hash_table_size, capacity, capacity)
    }

    pub fn with_threshold(hash_table_size: usize, capacity: usize, threshold: usize) -> Pool {
        Pool {
            state: Spinlock::new(State {
                index: HashIndex::new(hash_table_size, capacity),
                entries: (0..capacity).map(|_| None).collect(),
            }),
            hash_table_size,
            capacity,
            threshold,
        }
    }

    pub fn get_or_add_integer(&self, v: i32) -> Arc<i32> {
        self.get_or_add_ordered(v as i64, |entry| match entry {
            Entry::Integer(v, _) => Some(Arc::clone(v)),
            _ => None,
        }, |counter| Entry::Integer(Arc::new(v), AtomicU32::new(counter)))
    }

    pub fn get_or_add_bigint(&self, v: i64) -> Arc<i64> {
        self.get_or_add_ordered(v, |entry| match entry {
            Entry::BigInt(v, _) => Some(Arc::clone(v)),
            _ => None,
        }, |counter| Entry::BigInt(Arc::new(v), AtomicU32::new(counter)))
    }

    pub fn get_or_add_double(&self, v: f64) -> Arc<u64> {
        let bits = v.to_bits();
        self.get_or_add_ordered(bits as i64, |entry| match entry {
            Entry::Double(v, _) => Some(Arc::clone(v)),
            _ => None,
        }, |counter| Entry::Double(Arc::new(bits), AtomicU32::new(counter)))
    }

    pub fn get_or_add_timestamp_seconds(&self, seconds: i64) -> Arc<i64> {
        self.get_or_add_ordered(seconds, |entry| match entry {
            Entry::TimestampSeconds(v, _) => Some(Arc::clone(v)),
            _ => None,
        }, |counter| Entry::TimestampSeconds(Arc::new(seconds), AtomicU32::new(counter)))
    }

    pub fn get_or_add_varchar(&self, s: &str) -> Arc<String> {
        let hash = hash_str(s);
        self.get_or_add_equality(hash, |entry| match entry {
            Entry::Varchar(v, _) if v.as_str() == s => Some(Arc::clone(v)),
            _ => None,
        }, |counter| Entry::Varchar(Arc::new(s.to_string()), AtomicU32::new(counter)))
    }

    pub fn get_or_add_substring(&self, s: &str) -> Arc<str> {
        let hash = hash_str(s);
        self.get_or_add_equality(hash, |entry| match entry {
            Entry::Substring(v, _) if v.as_ref() == s => Some(Arc::clone(v)),
            _ => None,
        }, |counter| Entry::Substring(Arc::from(s), AtomicU32::new(counter)))
    }

    /// Number of distinct interned values across every kind.
    pub fn len(&self) -> usize {
        self.state.write().index.element_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walk a numerically-ascending chain, early-exiting once a strictly
    /// greater key is seen, and link a fresh node immediately before that
    /// point to keep the chain sorted.
    fn get_or_add_ordered(
        &self,
        key: i64,
        extract: impl Fn(&Entry) -> Option<Arc<impl KeyedBy>>,
        build: impl Fn(u32) -> Entry,
    ) -> Arc<impl KeyedBy> {
        let hash = key as u64;
        loop {
            let mut state = self.state.write();
            let bucket = state.index.bucket_for(hash);

            let mut prev: Option<i32> = None;
            let mut cur = state.index.get_lookup(bucket);
            while let Some(node) = cur {
                let entry = state.entries[node as usize].as_ref().expect("live node has an entry");
                let entry_key = entry_key_i64(entry);
                if entry_key == key {
                    if let Some(found) = extract(entry) {
                        entry.bump();
                        return found;
                    }
                }
                if entry_key > key {
                    break;
                }
                prev = Some(node);
                cur = state.index.get_next_lookup(node);
            }

            if state.index.element_count() >= self.threshold {
                drop(state);
                self.reset();
                continue;
            }

            let node = state.index.link_node(bucket, prev).expect("capacity checked by threshold");
            let entry = build(1);
            let result = extract(&entry);
            state.entries[node as usize] = Some(entry);
            return result.expect("freshly built entry always matches its own extractor");
        }
    }

    /// Walk a chain by equality only (string-like kinds never sort).
    fn get_or_add_equality(
        &self,
        hash: u64,
        extract: impl Fn(&Entry) -> Option<Arc<impl KeyedBy + ?Sized>>,
        build: impl Fn(u32) -> Entry,
    ) -> Arc<impl KeyedBy + ?Sized> {
        loop {
            let mut state = self.state.write();
            let bucket = state.index.bucket_for(hash);

            let mut last = None;
            let mut cur = state.index.get_lookup(bucket);
            while let Some(node) = cur {
                let entry = state.entries[node as usize].as_ref().expect("live node has an entry");
                if let Some(found) = extract(entry) {
                    entry.bump();
                    return found;
                }
                last = Some(node);
                cur = state.index.get_next_lookup(node);
            }

            if state.index.element_count() >= self.threshold {
                drop(state);
                self.reset();
                continue;
            }

            let node = state.index.link_node(bucket, last).expect("capacity checked by threshold");
            let entry = build(1);
            let result = extract(&entry);
            state.entries[node as usize] = Some(entry);
            return result.expect("freshly built entry always matches its own extractor");
        }
    }

    /// Purge policy: evict the coldest half of live entries (by access
    /// counter) and halve every survivor's counter so recent hits dominate
    /// again.
    fn reset(&self) {
        let mut state = self.state.write();
        let live: Vec<(i32, u32)> = state
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i as i32, e.count())))
            .collect();
        if live.is_empty() {
            return;
        }
        let mut counts: Vec<u32> = live.iter().map(|&(_, c)| c).collect();
        counts.sort_unstable();
        let cutoff = counts[counts.len() / 2];

        let mut fresh = HashIndex::new(self.hash_table_size, self.capacity);
        let mut fresh_entries: Vec<Option<Entry>> = (0..self.capacity).map(|_| None).collect();

        let survivors: Vec<(i32, u32)> = live.into_iter().filter(|&(_, c)| c > cutoff).collect();

        // Re-insert each survivor in key order, not in old-slot order: a
        // node's old hash-index slot reflects bump-pointer/freelist
        // allocation history, unrelated to its key. Walking each bucket's
        // existing (correctly-sorted) chain to find the right splice point
        // keeps ordered kinds ascending regardless of the iteration order
        // above.
        for (old_node, _) in survivors {
            let entry = state.entries[old_node as usize].take().unwrap();
            entry.halve_count();
            let hash = entry_hash(&entry);
            let bucket = fresh.bucket_for(hash);
            let ordered = entry_is_ordered(&entry);

            let mut prev = None;
            let mut cur = fresh.get_lookup(bucket);
            if ordered {
                let key = entry_key_i64(&entry);
                while let Some(node) = cur {
                    let existing = fresh_entries[node as usize].as_ref().expect("live node has an entry");
                    if entry_key_i64(existing) > key {
                        break;
                    }
                    prev = Some(node);
                    cur = fresh.get_next_lookup(node);
                }
            } else {
                // String-like kinds never sort; re-insert at the tail.
                while let Some(node) = cur {
                    prev = Some(node);
                    cur = fresh.get_next_lookup(node);
                }
            }

            let node = fresh.link_node(bucket, prev).expect("fresh index sized like the old one");
            fresh_entries[node as usize] = Some(entry);
        }

        state.index = fresh;
        state.entries = fresh_entries;
    }
}

/// Marker only used to let `extract` closures above return `Arc<T>` for
/// whichever concrete kind they matched; every interned payload type
/// implements it trivially.
trait KeyedBy {}
impl KeyedBy for i32 {}
impl KeyedBy for i64 {}
impl KeyedBy for u64 {}
impl KeyedBy for String {}
impl KeyedBy for str {}

fn entry_is_ordered(entry: &Entry) -> bool {
    matches!(
        entry,
        Entry::Integer(..) | Entry::BigInt(..) | Entry::Double(..) | Entry::TimestampSeconds(..)
    )
}

fn entry_key_i64(entry: &Entry) -> i64 {
    match entry {
        Entry::Integer(v, _) => **v as i64,
        Entry::BigInt(v, _) => **v,
        Entry::Double(v, _) => **v as i64,
        Entry::TimestampSeconds(v, _) => **v,
        Entry::Varchar(..) | Entry::Substring(..) => unreachable!("string-like kinds never walk the ordered path"),
    }
}

fn entry_hash(entry: &Entry) -> u64 {
    match entry {
        Entry::Integer(v, _) => **v as i64 as u64,
        Entry::BigInt(v, _) => **v as u64,
        Entry::Double(v, _) => **v,
        Entry::TimestampSeconds(v, _) => **v as u64,
        Entry::Varchar(v, _) => hash_str(v.as_str()),
        Entry::Substring(v, _) => hash_str(v.as_ref()),
    }
}

fn hash_str(s: &str) -> u64 {
    let mut h = CityHasher::new().build_hasher();
    h.write(s.as_bytes());
    h.finish()
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
