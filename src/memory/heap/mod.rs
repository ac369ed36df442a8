/*!
 * Simulated Heap
 *
 * Single-threaded heap simulator over the address range `[0, total_size)`.
 * Only extents are tracked, never payload bytes.
 *
 * ## Strategies
 *
 * - **Best fit**: variable-size blocks taken from the smallest free block that
 *   fits, ties broken by lowest address. Released blocks are coalesced with
 *   free neighbours immediately.
 * - **Pooling**: requests rounded up to a fixed size class. Released class
 *   blocks are kept on per-class LIFO lists and handed back out without
 *   splitting or merging.
 *
 * ## Failure modes
 *
 * - **Exhaustion**: total free space is smaller than the request
 * - **Fragmentation**: enough space is free in aggregate, but no admissible block
 * - **Double free** / **invalid free**: detected before any state change
 */

mod best_fit;
mod classifier;
mod pool;
mod pooling;
mod region_table;
mod stats;

use super::traits::{Allocator, MemoryInfo};
use super::types::{BlockState, HeapError, HeapResult, HeapSnapshot, HeapStats};
use crate::core::config::{ConfigError, HeapConfig, StrategyConfig};
use crate::core::types::{Address, Size};
use pool::PoolRegistry;
use region_table::RegionTable;
use tracing::{debug, info, warn};

/// Strategy state, resolved once at construction
#[derive(Debug, Clone)]
enum Engine {
    BestFit,
    Pooling(PoolRegistry),
}

impl Engine {
    fn name(&self) -> &'static str {
        match self {
            Engine::BestFit => "best_fit",
            Engine::Pooling(_) => "pooling",
        }
    }
}

/// Simulated heap allocator
#[derive(Debug, Clone)]
pub struct Heap {
    region: RegionTable,
    engine: Engine,
}

impl Heap {
    /// Create a heap of `total_size` bytes using `strategy`
    pub fn new(total_size: Size, strategy: StrategyConfig) -> Result<Self, ConfigError> {
        Self::from_config(&HeapConfig::new(total_size, strategy))
    }

    /// Create a best-fit heap
    pub fn best_fit(total_size: Size) -> Result<Self, ConfigError> {
        Self::from_config(&HeapConfig::best_fit(total_size))
    }

    /// Create a pooling heap with the default size classes
    pub fn pooling(total_size: Size) -> Result<Self, ConfigError> {
        Self::from_config(&HeapConfig::pooling(total_size))
    }

    pub fn from_config(config: &HeapConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let engine = match &config.strategy {
            StrategyConfig::BestFit => Engine::BestFit,
            StrategyConfig::Pooling { size_classes } => {
                Engine::Pooling(PoolRegistry::new(size_classes.clone()))
            }
        };

        info!(
            total_size = config.total_size,
            strategy = engine.name(),
            "Heap initialized"
        );

        Ok(Self {
            region: RegionTable::new(config.total_size),
            engine,
        })
    }

    /// Allocate `size` bytes and return the block start
    ///
    /// On failure nothing is mutated and the error says whether the heap is
    /// fragmented or exhausted.
    pub fn allocate(&mut self, size: Size) -> HeapResult<Address> {
        if size == 0 {
            return Err(HeapError::ZeroSize);
        }
        debug!(size, strategy = self.engine.name(), "allocate");

        let placed = match &mut self.engine {
            Engine::BestFit => best_fit::allocate(&mut self.region, size),
            Engine::Pooling(pools) => pooling::allocate(&mut self.region, pools, size),
        };

        placed.ok_or_else(|| classifier::classify(&self.region, size))
    }

    /// Release the block starting at `address`
    pub fn deallocate(&mut self, address: Address) -> HeapResult<()> {
        debug!(address, strategy = self.engine.name(), "deallocate");

        let result = match &mut self.engine {
            Engine::BestFit => best_fit::deallocate(&mut self.region, address),
            Engine::Pooling(pools) => pooling::deallocate(&mut self.region, pools, address),
        };

        if let Err(ref e) = result {
            warn!(address, error = %e, "Rejected deallocation");
        }
        result
    }

    /// Snapshot of blocks and pool contents
    pub fn dump(&self) -> HeapSnapshot {
        HeapSnapshot {
            strategy: self.engine.name().to_string(),
            total_size: self.region.total_size(),
            blocks: self.region.blocks().to_vec(),
            pools: match &self.engine {
                Engine::BestFit => Vec::new(),
                Engine::Pooling(pools) => pools.snapshot(),
            },
        }
    }

    /// Check if an address is the start of a live allocation
    pub fn is_allocated(&self, address: Address) -> bool {
        self.region
            .get(address)
            .map_or(false, |block| block.state == BlockState::Allocated)
    }

    /// Length of the block starting at `address`, in any state
    pub fn block_size(&self, address: Address) -> Option<Size> {
        self.region.get(address).map(|block| block.length)
    }

    pub fn total_size(&self) -> Size {
        self.region.total_size()
    }

    pub fn strategy_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Configured size classes; empty for best fit
    pub fn size_classes(&self) -> &[Size] {
        match &self.engine {
            Engine::BestFit => &[],
            Engine::Pooling(pools) => pools.classes(),
        }
    }
}

impl Allocator for Heap {
    fn allocate(&mut self, size: Size) -> HeapResult<Address> {
        Heap::allocate(self, size)
    }

    fn deallocate(&mut self, address: Address) -> HeapResult<()> {
        Heap::deallocate(self, address)
    }

    fn is_allocated(&self, address: Address) -> bool {
        Heap::is_allocated(self, address)
    }

    fn block_size(&self, address: Address) -> Option<Size> {
        Heap::block_size(self, address)
    }
}

impl MemoryInfo for Heap {
    fn stats(&self) -> HeapStats {
        Heap::stats(self)
    }
}
