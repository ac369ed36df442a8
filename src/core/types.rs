/*!
 * Core Types
 * Common types used across the heap simulator
 */

/// Offset into the simulated address range `[0, total_size)`
pub type Address = usize;

/// Extent length in bytes
pub type Size = usize;
