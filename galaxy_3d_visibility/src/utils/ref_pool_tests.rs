use slotmap::SlotMap;
use crate::scene::ObjectKey;
use super::*;

fn make_keys(count: usize) -> Vec<ObjectKey> {
    let mut map: SlotMap<ObjectKey, ()> = SlotMap::with_key();
    (0..count).map(|_| map.insert(())).collect()
}

fn sorted(mut values: Vec<u32>) -> Vec<u32> {
    values.sort_unstable();
    values
}

// ============================================================================
// Linking
// ============================================================================

#[test]
fn test_new_pool_is_empty() {
    let pool = RefPool::with_lists(4);
    assert!(pool.is_empty());
    assert_eq!(pool.list_count(), 4);
    assert_eq!(pool.list_len(3), 0);
    assert_eq!(pool.list_iter(2).count(), 0);
}

#[test]
fn test_link_adds_to_list_and_object() {
    let keys = make_keys(2);
    let mut pool = RefPool::with_lists(4);

    pool.link(keys[0], 1);
    pool.link(keys[1], 1);
    pool.link(keys[0], 3);

    assert_eq!(pool.len(), 3);
    assert_eq!(pool.list_len(1), 2);
    assert_eq!(pool.list_iter(1).collect::<Vec<_>>(), vec![keys[1], keys[0]]);
    assert_eq!(sorted(pool.object_lists(keys[0]).collect()), vec![1, 3]);
    assert!(pool.contains(keys[0], 3));
    assert!(!pool.contains(keys[1], 3));
}

#[test]
fn test_link_grows_lists_on_demand() {
    let keys = make_keys(1);
    let mut pool = RefPool::new();
    pool.link(keys[0], 7);
    assert_eq!(pool.list_count(), 8);
    assert_eq!(pool.list_len(7), 1);
    assert_eq!(pool.list_len(100), 0);
}

// ============================================================================
// Unlinking
// ============================================================================

#[test]
fn test_unlink_single_list() {
    let keys = make_keys(3);
    let mut pool = RefPool::with_lists(2);
    for key in &keys {
        pool.link(*key, 0);
    }
    pool.link(keys[1], 1);

    // Middle of the list
    assert!(pool.unlink(keys[1], 0));
    assert_eq!(pool.list_iter(0).collect::<Vec<_>>(), vec![keys[2], keys[0]]);
    assert_eq!(pool.object_lists(keys[1]).collect::<Vec<_>>(), vec![1]);

    // Head of the list
    assert!(pool.unlink(keys[2], 0));
    assert_eq!(pool.list_iter(0).collect::<Vec<_>>(), vec![keys[0]]);

    // Not linked there
    assert!(!pool.unlink(keys[2], 0));
    assert_eq!(pool.len(), 2);
}

#[test]
fn test_unlink_non_head_of_object_chain() {
    let keys = make_keys(1);
    let mut pool = RefPool::with_lists(3);
    pool.link(keys[0], 0);
    pool.link(keys[0], 1);
    pool.link(keys[0], 2);

    assert!(pool.unlink(keys[0], 1));
    assert_eq!(sorted(pool.object_lists(keys[0]).collect()), vec![0, 2]);
    assert!(pool.unlink(keys[0], 2));
    assert!(pool.unlink(keys[0], 0));
    assert_eq!(pool.object_lists(keys[0]).count(), 0);
    assert!(pool.is_empty());
}

#[test]
fn test_unlink_object_removes_every_link() {
    let keys = make_keys(2);
    let mut pool = RefPool::with_lists(4);
    for list in 0..4 {
        pool.link(keys[0], list);
        pool.link(keys[1], list);
    }

    assert_eq!(pool.unlink_object(keys[0]), 4);
    for list in 0..4 {
        assert_eq!(pool.list_iter(list).collect::<Vec<_>>(), vec![keys[1]]);
        assert_eq!(pool.list_len(list), 1);
    }
    assert_eq!(pool.unlink_object(keys[0]), 0);
    assert_eq!(pool.len(), 4);
}

#[test]
fn test_relink_after_unlink() {
    let keys = make_keys(1);
    let mut pool = RefPool::with_lists(1);
    pool.link(keys[0], 0);
    pool.unlink_object(keys[0]);
    pool.link(keys[0], 0);
    assert_eq!(pool.list_iter(0).collect::<Vec<_>>(), vec![keys[0]]);
}
