/*!
 * Pool Registry
 * Per-size-class reuse lists for the pooling strategy
 */

use crate::core::types::{Address, Size};
use crate::memory::types::PoolSnapshot;

/// One LIFO reuse list per configured size class
///
/// Classes are strictly ascending. `lists[i]` holds addresses of blocks of
/// exactly `classes[i]` bytes; the last pushed address is reused first.
#[derive(Debug, Clone)]
pub(crate) struct PoolRegistry {
    classes: Vec<Size>,
    lists: Vec<Vec<Address>>,
}

impl PoolRegistry {
    pub fn new(classes: Vec<Size>) -> Self {
        debug_assert!(classes.windows(2).all(|pair| pair[0] < pair[1]));
        let lists = vec![Vec::new(); classes.len()];
        Self { classes, lists }
    }

    pub fn classes(&self) -> &[Size] {
        &self.classes
    }

    /// Smallest class admitting `size`
    pub fn class_for(&self, size: Size) -> Option<usize> {
        let idx = self.classes.partition_point(|&class| class < size);
        (idx < self.classes.len()).then_some(idx)
    }

    /// Class whose length is exactly `length`
    pub fn class_of_length(&self, length: Size) -> Option<usize> {
        self.classes.binary_search(&length).ok()
    }

    pub fn class_size(&self, class: usize) -> Size {
        self.classes[class]
    }

    pub fn push(&mut self, class: usize, address: Address) {
        self.lists[class].push(address);
    }

    /// Most recently pooled address of exactly `class`
    pub fn pop(&mut self, class: usize) -> Option<Address> {
        self.lists[class].pop()
    }

    /// Pop from the first non-empty class above `class`, ascending
    ///
    /// Returns the class the address came from along with the address.
    pub fn pop_larger(&mut self, class: usize) -> Option<(usize, Address)> {
        let idx = (class + 1..self.lists.len()).find(|&idx| !self.lists[idx].is_empty())?;
        self.lists[idx].pop().map(|address| (idx, address))
    }

    /// Total number of pooled addresses
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn snapshot(&self) -> Vec<PoolSnapshot> {
        self.classes
            .iter()
            .zip(&self.lists)
            .map(|(&size_class, addresses)| PoolSnapshot {
                size_class,
                addresses: addresses.clone(),
            })
            .collect()
    }
}
