/*!
 * Pooling Strategy Tests
 */

use heap_sim::{BlockState, Heap, HeapError, PoolSnapshot, StrategyConfig};
use pretty_assertions::assert_eq;

fn pool_of(heap: &Heap, size_class: usize) -> Vec<usize> {
    heap.dump()
        .pools
        .into_iter()
        .find(|pool| pool.size_class == size_class)
        .map(|pool| pool.addresses)
        .unwrap_or_default()
}

#[test]
fn test_reuse_from_pool() {
    let mut heap = Heap::pooling(128).unwrap();
    let a = heap.allocate(40).unwrap();
    let b = heap.allocate(50).unwrap();
    assert_eq!((a, b), (0, 64));
    assert_eq!(heap.block_size(a), Some(64));
    assert_eq!(heap.block_size(b), Some(64));

    heap.deallocate(a).unwrap();
    assert_eq!(pool_of(&heap, 64), vec![a]);
    let blocks_before = heap.dump().blocks;

    let c = heap.allocate(32).unwrap();
    assert_eq!(c, a);
    assert!(pool_of(&heap, 64).is_empty());

    let extents = |blocks: &[heap_sim::Block]| -> Vec<(usize, usize)> {
        blocks.iter().map(|b| (b.start, b.length)).collect()
    };
    assert_eq!(extents(&heap.dump().blocks), extents(&blocks_before));
}

#[test]
fn test_fresh_carve_before_larger_pool() {
    let mut heap = Heap::pooling(256).unwrap();
    let a = heap.allocate(40).unwrap();
    assert_eq!(a, 0);
    heap.deallocate(a).unwrap();

    let b = heap.allocate(32).unwrap();
    assert_eq!(b, 64);
    assert_eq!(heap.block_size(b), Some(32));
    assert_eq!(pool_of(&heap, 64), vec![a]);
    assert_eq!(heap.allocate(64), Ok(a));
}

#[test]
fn test_pooling_walkthrough_sequence() {
    let mut heap = Heap::pooling(128).unwrap();
    assert_eq!(heap.allocate(20), Ok(0));
    let b = heap.allocate(50).unwrap();
    assert_eq!(b, 32);
    assert_eq!(
        heap.allocate(60),
        Err(HeapError::Exhaustion {
            requested: 60,
            total_free: 32,
            largest_free: 32,
        })
    );

    heap.deallocate(b).unwrap();
    assert_eq!(heap.allocate(40), Ok(b));
}

#[test]
fn test_lifo_order_within_class() {
    let mut heap = Heap::pooling(512).unwrap();
    let addrs: Vec<_> = (0..4).map(|_| heap.allocate(100).unwrap()).collect();
    assert_eq!(addrs, vec![0, 128, 256, 384]);

    heap.deallocate(addrs[0]).unwrap();
    heap.deallocate(addrs[2]).unwrap();
    heap.deallocate(addrs[1]).unwrap();
    assert_eq!(pool_of(&heap, 128), vec![0, 256, 128]);

    assert_eq!(heap.allocate(128), Ok(128));
    assert_eq!(heap.allocate(65), Ok(256));
    assert_eq!(heap.allocate(120), Ok(0));
}

#[test]
fn test_same_class_prefers_pool_over_fresh_space() {
    let mut heap = Heap::pooling(1024).unwrap();
    let a = heap.allocate(30).unwrap();
    heap.allocate(30).unwrap();
    heap.deallocate(a).unwrap();

    assert_eq!(heap.allocate(1), Ok(a));
}

#[test]
fn test_comparison_pattern() {
    let mut heap = Heap::new(200, StrategyConfig::pooling_default()).unwrap();
    let a = heap.allocate(30).unwrap();
    let b = heap.allocate(40).unwrap();
    let c = heap.allocate(30).unwrap();
    let d = heap.allocate(40).unwrap();
    assert_eq!((a, b, c, d), (0, 32, 96, 128));

    heap.deallocate(b).unwrap();
    heap.deallocate(d).unwrap();
    assert_eq!(pool_of(&heap, 64), vec![32, 128]);

    assert_eq!(heap.allocate(35), Ok(128));
}

#[test]
fn test_pooled_blocks_never_coalesce() {
    let mut heap = Heap::pooling(128).unwrap();
    let addrs: Vec<_> = (0..4).map(|_| heap.allocate(32).unwrap()).collect();
    for addr in &addrs {
        heap.deallocate(*addr).unwrap();
    }

    let snapshot = heap.dump();
    assert_eq!(snapshot.blocks.len(), 4);
    assert!(snapshot
        .blocks
        .iter()
        .all(|block| block.state == BlockState::Pooled));
    assert_eq!(
        snapshot.pools[0],
        PoolSnapshot {
            size_class: 32,
            addresses: addrs.clone(),
        }
    );

    // Pooled space counts as free, but a 64-byte class block cannot be formed
    assert_eq!(
        heap.allocate(64),
        Err(HeapError::Fragmentation {
            requested: 64,
            total_free: 128,
            largest_free: 32,
        })
    );
}

#[test]
fn test_double_free_of_pooled_address() {
    let mut heap = Heap::pooling(128).unwrap();
    let a = heap.allocate(10).unwrap();
    heap.deallocate(a).unwrap();

    assert_eq!(heap.deallocate(a), Err(HeapError::DoubleFree(a)));
    assert_eq!(pool_of(&heap, 32), vec![a]);
}

#[test]
fn test_custom_size_classes() {
    let mut heap = Heap::new(
        100,
        StrategyConfig::Pooling {
            size_classes: vec![10, 25],
        },
    )
    .unwrap();

    assert_eq!(heap.allocate(7), Ok(0));
    assert_eq!(heap.allocate(11), Ok(10));
    assert_eq!(heap.block_size(10), Some(25));
    assert!(heap.allocate(26).is_err());
}
