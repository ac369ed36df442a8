/*!
 * Memory Traits
 * Allocator abstractions
 */

use super::types::*;
use crate::core::types::{Address, Size};

/// Allocator interface
///
/// Operations take `&mut self`: a heap is driven by one caller at a time and
/// every call runs to completion before the next.
pub trait Allocator {
    /// Allocate `size` bytes, returning the block start
    fn allocate(&mut self, size: Size) -> HeapResult<Address>;

    /// Release the block starting at `address`
    fn deallocate(&mut self, address: Address) -> HeapResult<()>;

    /// Check if an address is the start of a live allocation
    fn is_allocated(&self, address: Address) -> bool;

    /// Get the length of the block starting at `address`
    fn block_size(&self, address: Address) -> Option<Size>;
}

/// Heap statistics provider
pub trait MemoryInfo {
    /// Get overall heap statistics
    fn stats(&self) -> HeapStats;

    /// Get heap info as (total, used, free)
    fn info(&self) -> (Size, Size, Size) {
        let stats = self.stats();
        (stats.total_size, stats.used_bytes, stats.free_bytes)
    }

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}
