//! Value pool interning: repeated lookups of the
//! same literal return the same boxed `Arc`, distinct literals never alias,
//! and crossing the purge threshold evicts the coldest half without making
//! the pool unusable.

use std::sync::Arc;

use avlix::pool::Pool;

#[test]
fn repeated_integer_lookups_share_one_allocation() {
    let pool = Pool::new(16, 64);
    let first = pool.get_or_add_integer(42);
    for _ in 0..20 {
        assert!(Arc::ptr_eq(&first, &pool.get_or_add_integer(42)));
    }
    assert_eq!(pool.len(), 1);
}

#[test]
fn distinct_literals_across_kinds_never_alias() {
    let pool = Pool::new(16, 64);
    let int_val = pool.get_or_add_integer(1);
    let big_val = pool.get_or_add_bigint(1);
    let dbl_val = pool.get_or_add_double(1.0);
    let str_val = pool.get_or_add_varchar("1");
    assert_eq!(*int_val, 1);
    assert_eq!(*big_val, 1);
    assert_eq!(*dbl_val, 1.0);
    assert_eq!(&*str_val, "1");
    assert_eq!(pool.len(), 4);
}

/// Crossing the configured purge threshold evicts the coldest half of
/// entries but leaves the pool usable for further interning afterward.
#[test]
fn crossing_threshold_purges_coldest_half_and_stays_usable() {
    let pool = Pool::with_threshold(8, 32, 16);
    let hot = pool.get_or_add_integer(0);
    // keep entry 0 warm relative to the rest.
    for _ in 0..50 {
        pool.get_or_add_integer(0);
    }
    for i in 1..20 {
        pool.get_or_add_integer(i);
    }
    assert!(pool.len() <= 32);
    assert!(Arc::ptr_eq(&hot, &pool.get_or_add_integer(0)));

    // pool keeps accepting new interns after the purge.
    let v = pool.get_or_add_integer(-1);
    assert_eq!(*v, -1);
}

#[test]
fn varchar_and_substring_both_intern_by_content_equality() {
    let pool = Pool::new(8, 32);
    let a = pool.get_or_add_varchar("hello world");
    let b = pool.get_or_add_varchar("hello world");
    assert!(Arc::ptr_eq(&a, &b));

    let sub_a = pool.get_or_add_substring("hello");
    let sub_b = pool.get_or_add_substring("hello");
    assert!(Arc::ptr_eq(&sub_a, &sub_b));
    assert!(!std::ptr::eq(&*a as *const str as *const u8, &*sub_a as *const str as *const u8));
}
