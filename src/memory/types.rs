/*!
 * Memory Types
 * Common types for the simulated heap
 */

use crate::core::limits::{
    PRESSURE_CRITICAL_PERCENT, PRESSURE_HIGH_PERCENT, PRESSURE_MEDIUM_PERCENT,
};
use crate::core::types::{Address, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Heap operation result
pub type HeapResult<T> = Result<T, HeapError>;

/// Heap errors
///
/// Every variant is raised before any state change: a failed call leaves the
/// heap exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum HeapError {
    #[error("Out of memory: requested {requested} bytes, {total_free} bytes free (largest block {largest_free})")]
    #[diagnostic(
        code(heap::exhaustion),
        help("Total free space is smaller than the request. Free existing allocations first.")
    )]
    Exhaustion {
        requested: Size,
        total_free: Size,
        largest_free: Size,
    },

    #[error("Fragmentation: requested {requested} bytes, {total_free} bytes free but largest admissible block is {largest_free}")]
    #[diagnostic(
        code(heap::fragmentation),
        help("Enough memory is free in aggregate, but no single block can satisfy the request.")
    )]
    Fragmentation {
        requested: Size,
        total_free: Size,
        largest_free: Size,
    },

    #[error("Double free at address {0}")]
    #[diagnostic(code(heap::double_free), help("The block at this address is already free."))]
    DoubleFree(Address),

    #[error("Invalid free at address {0}")]
    #[diagnostic(
        code(heap::invalid_free),
        help("Only addresses returned by allocate can be released.")
    )]
    InvalidFree(Address),

    #[error("Zero-byte allocation requested")]
    #[diagnostic(code(heap::zero_size))]
    ZeroSize,
}

impl HeapError {
    /// True for the two allocation-failure classes
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            HeapError::Exhaustion { .. } | HeapError::Fragmentation { .. }
        )
    }
}

/// Block tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    /// Coalescable free extent
    Free,
    /// Handed out to a caller
    Allocated,
    /// Released into a size-class pool: free, but exempt from coalescing and fit searches
    Pooled,
}

impl BlockState {
    /// Free space for diagnostics, pooled or not
    pub fn is_free(self) -> bool {
        matches!(self, BlockState::Free | BlockState::Pooled)
    }
}

/// Contiguous extent of the simulated address range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub start: Address,
    pub length: Size,
    pub state: BlockState,
}

impl Block {
    pub fn new(start: Address, length: Size, state: BlockState) -> Self {
        Self {
            start,
            length,
            state,
        }
    }

    /// One past the last address of this block
    pub fn end(&self) -> Address {
        self.start + self.length
    }
}

/// Reuse list contents for one size class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub size_class: Size,
    /// Push order; the last entry is reused first
    pub addresses: Vec<Address>,
}

/// Read-only view of heap state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapSnapshot {
    pub strategy: String,
    pub total_size: Size,
    pub blocks: Vec<Block>,
    pub pools: Vec<PoolSnapshot>,
}

/// Heap statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeapStats {
    pub total_size: Size,
    pub used_bytes: Size,
    pub free_bytes: Size,
    pub largest_free: Size,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub pooled_blocks: usize,
    pub usage_percentage: f64,
    /// `1 - largest_free / free_bytes`; 0.0 when nothing is free
    pub fragmentation: f64,
}

impl HeapStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        if self.usage_percentage >= PRESSURE_CRITICAL_PERCENT {
            MemoryPressure::Critical
        } else if self.usage_percentage >= PRESSURE_HIGH_PERCENT {
            MemoryPressure::High
        } else if self.usage_percentage >= PRESSURE_MEDIUM_PERCENT {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
