/*!
 * Failure Classifier
 * Distinguishes fragmentation from true exhaustion after a failed allocation
 */

use super::region_table::RegionTable;
use crate::core::types::Size;
use crate::memory::types::HeapError;
use tracing::warn;

/// Classify a failed request against the current free blocks
///
/// Read-only: the region table is inspected, never mutated.
pub(super) fn classify(region: &RegionTable, requested: Size) -> HeapError {
    let free = region.free_block_lengths();
    let total_free: Size = free.iter().sum();
    let largest_free = free.iter().copied().max().unwrap_or(0);

    if total_free >= requested {
        warn!(requested, total_free, largest_free, "Allocation failed: heap fragmented");
        HeapError::Fragmentation {
            requested,
            total_free,
            largest_free,
        }
    } else {
        warn!(requested, total_free, largest_free, "Allocation failed: out of memory");
        HeapError::Exhaustion {
            requested,
            total_free,
            largest_free,
        }
    }
}
