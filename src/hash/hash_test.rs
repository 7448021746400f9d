use super::*;

#[test]
fn test_link_and_lookup_head_of_chain() {
    let mut idx = HashIndex::new(4, 8);
    let bucket = idx.bucket_for(10);
    let a = idx.link_node(bucket, None).unwrap();
    let b = idx.link_node(bucket, None).unwrap();
    assert_eq!(idx.get_lookup(bucket), Some(b));
    assert_eq!(idx.get_next_lookup(b), Some(a));
    assert_eq!(idx.get_next_lookup(a), None);
    assert_eq!(idx.element_count(), 2);
}

#[test]
fn test_unlink_to_empty_resets_like_fresh() {
    let mut idx = HashIndex::new(4, 8);
    let bucket = idx.bucket_for(1);
    let a = idx.link_node(bucket, None).unwrap();
    idx.unlink_node(bucket, None, a);
    assert_eq!(idx.element_count(), 0);
    assert_eq!(idx.new_node_pointer(), 0);
    for b in 0..4 {
        assert_eq!(idx.get_lookup(b), None);
    }
}

/// hash-table-size 4, capacity 8, six nodes (0..5) linked, node 2
/// unlinked, then compacted with `removeEmptyNode`.
#[test]
fn test_remove_empty_node_compaction_scenario_five() {
    let mut idx = HashIndex::new(4, 8);
    let bucket = 0usize;
    let mut last = None;
    for _ in 0..6 {
        let n = idx.link_node(bucket, last).unwrap();
        last = Some(n);
    }
    // nodes 0..5 now chained in bucket 0, in link order 0 -> 1 -> ... -> 5.
    assert_eq!(idx.new_node_pointer(), 6);

    // unlink node 2 (prev in chain is node 1).
    idx.unlink_node(bucket, Some(1), 2);
    assert_eq!(idx.element_count(), 5);

    idx.remove_empty_node(2).unwrap();
    assert_eq!(idx.new_node_pointer(), 5);

    // every surviving chain pointer that used to be >= 3 is now one less.
    let head = idx.get_lookup(bucket).unwrap();
    let mut seen = vec![head];
    let mut cur = head;
    while let Some(next) = idx.get_next_lookup(cur) {
        seen.push(next);
        cur = next;
    }
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_insert_empty_node_then_link_returns_same_index() {
    let mut idx = HashIndex::new(4, 8);
    let bucket = idx.bucket_for(7);
    idx.link_node(bucket, None).unwrap();
    idx.link_node(bucket, None).unwrap();

    idx.insert_empty_node(1).unwrap();
    let node = idx.link_node(bucket, None).unwrap();
    assert_eq!(node, 1);
}

#[test]
fn test_stats_reports_freelist_and_chain_length() {
    let mut idx = HashIndex::new(2, 8);
    let bucket = idx.bucket_for(3);
    let a = idx.link_node(bucket, None).unwrap();
    idx.link_node(bucket, Some(a)).unwrap();
    let stats = idx.stats();
    assert_eq!(stats.element_count, 2);
    assert_eq!(stats.max_chain_len, 2);
    assert_eq!(stats.freelist_len, 0);
}
