/*!
 * Memory Module
 * Simulated heap allocation
 */

pub mod heap;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use heap::Heap;
pub use traits::*;
pub use types::*;
