/*!
 * Pooling Strategy
 * Size-class allocation with LIFO reuse of released blocks
 *
 * A request is rounded up to the smallest configured class. Released blocks
 * whose length matches a class go onto that class's reuse list instead of
 * being coalesced, so the next request of that class gets the same address
 * back without splitting anything.
 */

use super::pool::PoolRegistry;
use super::region_table::RegionTable;
use crate::core::types::{Address, Size};
use crate::memory::types::HeapResult;
use tracing::{debug, info};

/// Serve `size` from its class pool, a fresh carve, or a larger pool
///
/// Larger pooled blocks are only taken once no free block can hold the
/// class. `None` means the request exceeds every class or nothing fits.
pub(super) fn allocate(
    region: &mut RegionTable,
    pools: &mut PoolRegistry,
    size: Size,
) -> Option<Address> {
    let Some(class) = pools.class_for(size) else {
        debug!(
            size,
            largest_class = pools.classes().last().copied().unwrap_or(0),
            "Request exceeds every size class"
        );
        return None;
    };
    let class_size = pools.class_size(class);

    if let Some(address) = pools.pop(class) {
        reclaim(region, address, class_size);
        info!(address, size, size_class = class_size, "Reused chunk from pool");
        return Some(address);
    }

    if let Some(idx) = region.find_first_fit(class_size) {
        let address = region.place(idx, class_size);
        info!(address, size, size_class = class_size, "New chunk carved for pool class");
        return Some(address);
    }

    let (from, address) = pools.pop_larger(class)?;
    let from_size = pools.class_size(from);
    reclaim(region, address, from_size);
    info!(address, size, size_class = from_size, "Reused chunk from larger pool class");
    Some(address)
}

fn reclaim(region: &mut RegionTable, address: Address, class_size: Size) {
    let reclaimed = region.reclaim_pooled(address);
    debug_assert_eq!(reclaimed, Some(class_size), "pool and region disagree at {address}");
}

/// Return a class-sized block to its pool; anything else is coalesced
pub(super) fn deallocate(
    region: &mut RegionTable,
    pools: &mut PoolRegistry,
    address: Address,
) -> HeapResult<()> {
    let length = region.release(address)?;

    match pools.class_of_length(length) {
        Some(class) => {
            region.mark_pooled(address);
            pools.push(class, address);
            info!(
                address,
                size_class = length,
                pooled = pools.len(),
                "Returned chunk to pool"
            );
        }
        None => {
            region.coalesce();
            debug!(address, length, "Released unpooled block, coalesced");
        }
    }
    Ok(())
}
