/*!
 * Core Module
 * Shared types, limits, and configuration
 */

pub mod config;
pub mod limits;
pub mod types;

pub use config::{ConfigError, HeapConfig, StrategyConfig};
pub use types::{Address, Size};
