/*!
 * Heap Statistics
 * Usage and fragmentation figures derived from the region table
 */

use super::Heap;
use crate::memory::types::{BlockState, HeapStats};

impl Heap {
    /// Get heap statistics
    pub fn stats(&self) -> HeapStats {
        let total_size = self.region.total_size();
        let mut used_bytes = 0;
        let mut free_bytes = 0;
        let mut largest_free = 0;
        let mut allocated_blocks = 0;
        let mut free_blocks = 0;
        let mut pooled_blocks = 0;

        for block in self.region.blocks() {
            match block.state {
                BlockState::Allocated => {
                    used_bytes += block.length;
                    allocated_blocks += 1;
                }
                BlockState::Free | BlockState::Pooled => {
                    free_bytes += block.length;
                    largest_free = largest_free.max(block.length);
                    if block.state == BlockState::Pooled {
                        pooled_blocks += 1;
                    } else {
                        free_blocks += 1;
                    }
                }
            }
        }

        let fragmentation = if free_bytes == 0 {
            0.0
        } else {
            1.0 - largest_free as f64 / free_bytes as f64
        };

        HeapStats {
            total_size,
            used_bytes,
            free_bytes,
            largest_free,
            allocated_blocks,
            free_blocks,
            pooled_blocks,
            usage_percentage: used_bytes as f64 / total_size as f64 * 100.0,
            fragmentation,
        }
    }
}
