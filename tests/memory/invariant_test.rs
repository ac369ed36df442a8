/*!
 * Heap Invariant Property Tests
 * Random allocate/free sequences against both strategies
 */

use heap_sim::{BlockState, Heap, HeapError, HeapSnapshot, StrategyConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    /// Free the n-th live allocation (modulo live count)
    Free(usize),
    /// Free an arbitrary address, usually invalid or already free
    FreeRaw(usize),
}

fn op_strategy(max_size: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1..=max_size).prop_map(Op::Allocate),
        3 => any::<usize>().prop_map(Op::Free),
        1 => (0..1024usize).prop_map(Op::FreeRaw),
    ]
}

fn assert_partition(snapshot: &HeapSnapshot) {
    let mut expected_start = 0;
    for block in &snapshot.blocks {
        assert!(block.length > 0);
        assert_eq!(block.start, expected_start);
        expected_start = block.end();
    }
    assert_eq!(expected_start, snapshot.total_size);
}

fn assert_no_adjacent_free(snapshot: &HeapSnapshot) {
    for pair in snapshot.blocks.windows(2) {
        assert!(
            !(pair[0].state == BlockState::Free && pair[1].state == BlockState::Free),
            "adjacent free blocks at {} and {}",
            pair[0].start,
            pair[1].start
        );
    }
}

fn assert_pools_consistent(snapshot: &HeapSnapshot) {
    let pooled: usize = snapshot.pools.iter().map(|p| p.addresses.len()).sum();
    let tagged = snapshot
        .blocks
        .iter()
        .filter(|b| b.state == BlockState::Pooled)
        .count();
    assert_eq!(pooled, tagged);

    for pool in &snapshot.pools {
        for addr in &pool.addresses {
            let block = snapshot
                .blocks
                .iter()
                .find(|b| b.start == *addr)
                .expect("pooled address has no block");
            assert_eq!(block.state, BlockState::Pooled);
            assert_eq!(block.length, pool.size_class);
        }
    }
}

fn run(heap: &mut Heap, ops: &[Op]) {
    let mut live: Vec<usize> = Vec::new();

    for op in ops {
        let before = heap.dump();
        let result = match *op {
            Op::Allocate(size) => heap.allocate(size).map(|addr| {
                assert!(!live.contains(&addr));
                live.push(addr);
            }),
            Op::Free(n) if !live.is_empty() => {
                let addr = live.remove(n % live.len());
                heap.deallocate(addr)
            }
            Op::Free(_) => Ok(()),
            Op::FreeRaw(addr) if live.contains(&addr) => Ok(()),
            Op::FreeRaw(addr) => heap.deallocate(addr),
        };

        let after = heap.dump();
        match result {
            Ok(()) => {
                if matches!(op, Op::Free(_)) && after.strategy == "best_fit" {
                    assert_no_adjacent_free(&after);
                }
            }
            Err(e) => {
                assert!(matches!(
                    e,
                    HeapError::Exhaustion { .. }
                        | HeapError::Fragmentation { .. }
                        | HeapError::DoubleFree(_)
                        | HeapError::InvalidFree(_)
                ));
                assert_eq!(before, after, "failed call mutated the heap");
            }
        }

        assert_partition(&after);
        assert_pools_consistent(&after);
        for addr in &live {
            assert!(heap.is_allocated(*addr));
        }
    }
}

proptest! {
    #[test]
    fn best_fit_preserves_invariants(ops in prop::collection::vec(op_strategy(300), 1..80)) {
        let mut heap = Heap::best_fit(1024).unwrap();
        run(&mut heap, &ops);
    }

    #[test]
    fn pooling_preserves_invariants(ops in prop::collection::vec(op_strategy(600), 1..80)) {
        let mut heap = Heap::new(1024, StrategyConfig::pooling_default()).unwrap();
        run(&mut heap, &ops);
    }

    #[test]
    fn pooling_reuses_last_freed_address(sizes in prop::collection::vec(1..=512usize, 1..8), pick in any::<usize>()) {
        let mut heap = Heap::pooling(4096).unwrap();
        let addrs: Vec<usize> = sizes.iter().map(|&s| heap.allocate(s).unwrap()).collect();

        let idx = pick % addrs.len();
        heap.deallocate(addrs[idx]).unwrap();
        let blocks_before = heap.dump().blocks;

        prop_assert_eq!(heap.allocate(sizes[idx]), Ok(addrs[idx]));
        let blocks_after = heap.dump().blocks;
        let extents = |snapshot: &[heap_sim::Block]| -> Vec<(usize, usize)> {
            snapshot.iter().map(|b| (b.start, b.length)).collect()
        };
        prop_assert_eq!(extents(&blocks_before), extents(&blocks_after));
    }

    #[test]
    fn best_fit_tie_break_is_lowest_address(holes in 2..6usize, size in 1..=16usize) {
        // Equal 16-byte holes separated by 8-byte allocations
        let mut heap = Heap::best_fit(holes * 24).unwrap();
        let mut hole_addrs = Vec::new();
        for _ in 0..holes {
            hole_addrs.push(heap.allocate(16).unwrap());
            heap.allocate(8).unwrap();
        }
        for addr in hole_addrs.iter().rev() {
            heap.deallocate(*addr).unwrap();
        }

        prop_assert_eq!(heap.allocate(size), Ok(hole_addrs[0]));
    }
}
