//! Chained-bucket hash index compaction: unlinking a
//! node followed by `removeEmptyNode` must shift every higher node index
//! down by one and preserve the remaining chain membership, exercised here
//! through the crate's public surface rather than the in-module test.

use avlix::hash::HashIndex;

#[test]
fn scenario_five_remove_empty_node_shifts_surviving_indices() {
    let mut idx = HashIndex::new(4, 8);
    let bucket = 0usize;
    let mut last = None;
    for _ in 0..6 {
        last = Some(idx.link_node(bucket, last).unwrap());
    }
    assert_eq!(idx.new_node_pointer(), 6);
    assert_eq!(idx.element_count(), 6);

    idx.unlink_node(bucket, Some(1), 2);
    assert_eq!(idx.element_count(), 5);

    idx.remove_empty_node(2).unwrap();
    assert_eq!(idx.new_node_pointer(), 5);

    let mut seen = vec![idx.get_lookup(bucket).unwrap()];
    while let Some(next) = idx.get_next_lookup(*seen.last().unwrap()) {
        seen.push(next);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

/// `insertEmptyNode` threads a freed slot back onto the freelist so the next
/// `linkNode` reuses it instead of growing `new_node_pointer`.
#[test]
fn freed_slot_is_reused_before_growing_capacity() {
    let mut idx = HashIndex::new(4, 8);
    let bucket = idx.bucket_for(7);
    idx.link_node(bucket, None).unwrap();
    idx.link_node(bucket, None).unwrap();
    assert_eq!(idx.new_node_pointer(), 2);

    idx.insert_empty_node(1).unwrap();
    let reused = idx.link_node(bucket, None).unwrap();
    assert_eq!(reused, 1);
    assert_eq!(idx.new_node_pointer(), 2);
}

#[test]
fn stats_reflect_chain_length_and_freelist_depth() {
    let mut idx = HashIndex::new(2, 8);
    let bucket = idx.bucket_for(3);
    let a = idx.link_node(bucket, None).unwrap();
    let b = idx.link_node(bucket, Some(a)).unwrap();
    let stats = idx.stats();
    assert_eq!(stats.element_count, 2);
    assert_eq!(stats.max_chain_len, 2);
    assert_eq!(stats.freelist_len, 0);

    idx.unlink_node(bucket, Some(a), b);
    idx.insert_empty_node(b).unwrap();
    let stats = idx.stats();
    assert_eq!(stats.element_count, 1);
    assert_eq!(stats.freelist_len, 1);
}
