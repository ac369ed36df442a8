/*!
 * Heap Simulator Library
 *
 * Simulated heap allocator with interchangeable best-fit and size-class
 * pooling strategies. Reproduces the classic failure modes: exhaustion,
 * fragmentation, double free and invalid free.
 *
 * ```
 * use heap_sim::{Heap, HeapError};
 *
 * let mut heap = Heap::best_fit(100).unwrap();
 * let addrs: Vec<_> = (0..4).map(|_| heap.allocate(20).unwrap()).collect();
 * heap.deallocate(addrs[1]).unwrap();
 * heap.deallocate(addrs[3]).unwrap();
 *
 * assert!(matches!(heap.allocate(45), Err(HeapError::Fragmentation { .. })));
 * ```
 */

pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::{Address, ConfigError, HeapConfig, Size, StrategyConfig};
pub use memory::{
    Allocator, Block, BlockState, Heap, HeapError, HeapResult, HeapSnapshot, HeapStats,
    MemoryInfo, MemoryPressure, PoolSnapshot,
};
pub use monitoring::init_tracing;
