/*!
 * Region Table
 * Ordered partition of the address range into free and allocated blocks
 */

use crate::core::types::{Address, Size};
use crate::memory::types::{Block, BlockState, HeapError, HeapResult};
use tracing::debug;

/// Partition of `[0, total_size)` into contiguous blocks
///
/// Blocks are kept in strictly increasing `start` order, never overlap, never
/// leave a gap, and never have zero length.
#[derive(Debug, Clone)]
pub(crate) struct RegionTable {
    total_size: Size,
    blocks: Vec<Block>,
}

impl RegionTable {
    /// Single free block spanning the whole range
    pub fn new(total_size: Size) -> Self {
        Self {
            total_size,
            blocks: vec![Block::new(0, total_size, BlockState::Free)],
        }
    }

    pub fn total_size(&self) -> Size {
        self.total_size
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Index of the block starting exactly at `address`
    pub fn position(&self, address: Address) -> Option<usize> {
        self.blocks
            .binary_search_by_key(&address, |block| block.start)
            .ok()
    }

    pub fn get(&self, address: Address) -> Option<&Block> {
        self.position(address).map(|idx| &self.blocks[idx])
    }

    /// Smallest free block with `length >= size`; the lowest address wins ties
    pub fn find_best_fit(&self, size: Size) -> Option<usize> {
        let mut best: Option<(usize, Size)> = None;

        for (idx, block) in self.blocks.iter().enumerate() {
            if block.state != BlockState::Free || block.length < size {
                continue;
            }
            match best {
                Some((_, best_len)) if block.length >= best_len => {}
                _ => best = Some((idx, block.length)),
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// First free block in address order with `length >= size`
    pub fn find_first_fit(&self, size: Size) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.state == BlockState::Free && block.length >= size)
    }

    /// Allocate exactly `size` bytes from the free block at `index`
    ///
    /// Any remainder becomes a new free block directly after it.
    pub fn place(&mut self, index: usize, size: Size) -> Address {
        let block = self.blocks[index];
        debug_assert_eq!(block.state, BlockState::Free);
        debug_assert!(size > 0 && block.length >= size);

        self.blocks[index] = Block::new(block.start, size, BlockState::Allocated);

        if block.length > size {
            let remainder = Block::new(block.start + size, block.length - size, BlockState::Free);
            debug!(
                start = remainder.start,
                length = remainder.length,
                "Split block, remainder returned to region table"
            );
            self.blocks.insert(index + 1, remainder);
        }

        block.start
    }

    /// Mark the block at `address` free and return its length
    ///
    /// The caller decides whether to pool the block or coalesce.
    pub fn release(&mut self, address: Address) -> HeapResult<Size> {
        let idx = self
            .position(address)
            .ok_or(HeapError::InvalidFree(address))?;

        let block = &mut self.blocks[idx];
        if block.state.is_free() {
            return Err(HeapError::DoubleFree(address));
        }

        block.state = BlockState::Free;
        Ok(block.length)
    }

    /// Hand a just-released block over to a pool
    pub fn mark_pooled(&mut self, address: Address) {
        let idx = self.position(address);
        debug_assert!(idx.is_some(), "no block starts at {address}");
        if let Some(idx) = idx {
            debug_assert_eq!(self.blocks[idx].state, BlockState::Free);
            self.blocks[idx].state = BlockState::Pooled;
        }
    }

    /// Take a pooled block back into service; extents are untouched
    ///
    /// `None` if no pooled block starts at `address`; nothing changes then.
    pub fn reclaim_pooled(&mut self, address: Address) -> Option<Size> {
        let idx = self.position(address)?;
        let block = &mut self.blocks[idx];
        if block.state != BlockState::Pooled {
            return None;
        }
        block.state = BlockState::Allocated;
        Some(block.length)
    }

    /// Merge every run of adjacent free blocks into one
    ///
    /// Pooled blocks are left alone. Returns the number of merges performed.
    pub fn coalesce(&mut self) -> usize {
        let before = self.blocks.len();
        let mut i = 0;

        while i + 1 < self.blocks.len() {
            let (current, next) = (self.blocks[i], self.blocks[i + 1]);
            if current.state == BlockState::Free && next.state == BlockState::Free {
                debug_assert_eq!(current.end(), next.start);
                self.blocks[i].length += next.length;
                self.blocks.remove(i + 1);
            } else {
                i += 1;
            }
        }

        let merged = before - self.blocks.len();
        if merged > 0 {
            debug!(
                merged,
                blocks = self.blocks.len(),
                "Coalesced adjacent free blocks"
            );
        }
        merged
    }

    /// Lengths of all free blocks (pooled included), in address order
    pub fn free_block_lengths(&self) -> Vec<Size> {
        self.blocks
            .iter()
            .filter(|block| block.state.is_free())
            .map(|block| block.length)
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn assert_partition(table: &RegionTable) {
    let mut expected_start = 0;
    for block in table.blocks() {
        assert!(block.length > 0, "zero-length block at {}", block.start);
        assert_eq!(block.start, expected_start, "gap or overlap at {}", block.start);
        expected_start = block.end();
    }
    assert_eq!(expected_start, table.total_size());
}
