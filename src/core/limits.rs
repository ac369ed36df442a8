/*!
 * Heap Limits and Constants
 *
 * Centralized defaults for heap construction and pressure reporting.
 */

// =============================================================================
// HEAP DEFAULTS
// =============================================================================

/// Default simulated heap size (4KB)
/// Used when no explicit size is configured
pub const DEFAULT_HEAP_SIZE: usize = 4 * 1024;

/// Default size classes for the pooling strategy
/// Ascending powers of two from 32B to 512B
pub const DEFAULT_SIZE_CLASSES: [usize; 5] = [32, 64, 128, 256, 512];

// =============================================================================
// MEMORY PRESSURE THRESHOLDS (percent of total heap in use)
// =============================================================================

/// Medium pressure threshold
pub const PRESSURE_MEDIUM_PERCENT: f64 = 60.0;

/// High pressure threshold
pub const PRESSURE_HIGH_PERCENT: f64 = 80.0;

/// Critical pressure threshold
pub const PRESSURE_CRITICAL_PERCENT: f64 = 95.0;

// =============================================================================
// ENVIRONMENT KEYS
// =============================================================================

/// Total heap size in bytes
pub const ENV_TOTAL_SIZE: &str = "HEAP_TOTAL_SIZE";

/// Strategy name: `best_fit` or `pooling`
pub const ENV_STRATEGY: &str = "HEAP_STRATEGY";

/// Comma-separated ascending size classes for pooling
pub const ENV_SIZE_CLASSES: &str = "HEAP_SIZE_CLASSES";

/// Enables JSON trace output when set to `1` or `true`
pub const ENV_TRACE_JSON: &str = "HEAP_TRACE_JSON";
