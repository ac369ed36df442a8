/*!
 * Best-Fit Strategy
 * Variable-size allocation from the smallest admissible free block
 */

use super::region_table::RegionTable;
use crate::core::types::{Address, Size};
use crate::memory::types::HeapResult;
use tracing::debug;

/// Place `size` bytes in the smallest free block that holds them
///
/// `None` means no single free block is large enough.
pub(super) fn allocate(region: &mut RegionTable, size: Size) -> Option<Address> {
    let idx = region.find_best_fit(size)?;
    let block_len = region.blocks()[idx].length;
    let address = region.place(idx, size);

    debug!(address, size, block_len, "Best-fit placed allocation");
    Some(address)
}

/// Release a block and merge it with free neighbours
pub(super) fn deallocate(region: &mut RegionTable, address: Address) -> HeapResult<()> {
    let length = region.release(address)?;
    region.coalesce();

    debug!(address, length, "Best-fit released block");
    Ok(())
}
