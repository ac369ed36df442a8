/*!
 * Heap Configuration
 *
 * Construction-time configuration for the simulated heap. A configuration is
 * fixed for the lifetime of the heap it builds: strategy and total size never
 * change afterwards.
 *
 * Sources:
 * - Programmatic: `HeapConfig::new` / `HeapConfig::default`
 * - Environment: `HEAP_TOTAL_SIZE`, `HEAP_STRATEGY`, `HEAP_SIZE_CLASSES`
 * - JSON: `{"total_size":128,"strategy":{"kind":"pooling","size_classes":[32,64]}}`
 */

use super::limits::{
    DEFAULT_HEAP_SIZE, DEFAULT_SIZE_CLASSES, ENV_SIZE_CLASSES, ENV_STRATEGY, ENV_TOTAL_SIZE,
};
use super::types::Size;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Heap size must be positive")]
    #[diagnostic(code(config::zero_total_size))]
    ZeroTotalSize,

    #[error("Pooling strategy requires at least one size class")]
    #[diagnostic(code(config::empty_size_classes))]
    EmptySizeClasses,

    #[error("Size class must be positive")]
    #[diagnostic(code(config::zero_size_class))]
    ZeroSizeClass,

    #[error("Size classes must be strictly ascending: {0:?}")]
    #[diagnostic(
        code(config::unordered_size_classes),
        help("List each class once, smallest first, e.g. 32,64,128")
    )]
    UnorderedSizeClasses(Vec<Size>),

    #[error("Unknown allocation strategy: {0}")]
    #[diagnostic(
        code(config::unknown_strategy),
        help("Supported strategies are `best_fit` and `pooling`")
    )]
    UnknownStrategy(String),

    #[error("Invalid value for {key}: {value}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { key: String, value: String },

    #[error("Malformed configuration: {0}")]
    #[diagnostic(code(config::malformed))]
    Malformed(String),
}

/// Allocation strategy selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Variable-size best-fit over the whole address range
    BestFit,
    /// Fixed size classes with LIFO reuse lists
    Pooling { size_classes: Vec<Size> },
}

impl StrategyConfig {
    /// Pooling with the default 32..512 byte classes
    pub fn pooling_default() -> Self {
        StrategyConfig::Pooling {
            size_classes: DEFAULT_SIZE_CLASSES.to_vec(),
        }
    }

    /// Stable short name, as used in `HEAP_STRATEGY`
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::BestFit => "best_fit",
            StrategyConfig::Pooling { .. } => "pooling",
        }
    }

    /// Check size classes are non-empty, positive and strictly ascending
    pub fn validate(&self) -> Result<(), ConfigError> {
        let StrategyConfig::Pooling { size_classes } = self else {
            return Ok(());
        };

        if size_classes.is_empty() {
            return Err(ConfigError::EmptySizeClasses);
        }
        if size_classes.contains(&0) {
            return Err(ConfigError::ZeroSizeClass);
        }
        if size_classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::UnorderedSizeClasses(size_classes.clone()));
        }
        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::BestFit
    }
}

/// Heap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapConfig {
    /// Size of the simulated address range
    pub total_size: Size,
    /// Strategy fixed at construction
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            total_size: DEFAULT_HEAP_SIZE,
            strategy: StrategyConfig::BestFit,
        }
    }
}

impl HeapConfig {
    pub fn new(total_size: Size, strategy: StrategyConfig) -> Self {
        Self {
            total_size,
            strategy,
        }
    }

    /// Best-fit heap of the given size
    pub fn best_fit(total_size: Size) -> Self {
        Self::new(total_size, StrategyConfig::BestFit)
    }

    /// Pooling heap of the given size with the default size classes
    pub fn pooling(total_size: Size) -> Self {
        Self::new(total_size, StrategyConfig::pooling_default())
    }

    /// Validate the construction contract
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_size == 0 {
            return Err(ConfigError::ZeroTotalSize);
        }
        self.strategy.validate()
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - HEAP_TOTAL_SIZE: heap size in bytes (default: 4096)
    /// - HEAP_STRATEGY: `best_fit` or `pooling` (default: best_fit)
    /// - HEAP_SIZE_CLASSES: comma-separated classes for pooling (default: 32,64,128,256,512)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: HeapConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let total_size = match lookup(ENV_TOTAL_SIZE) {
            Some(raw) => parse_size(ENV_TOTAL_SIZE, &raw)?,
            None => DEFAULT_HEAP_SIZE,
        };

        let strategy = match lookup(ENV_STRATEGY).as_deref().map(str::trim) {
            None | Some("best_fit") => StrategyConfig::BestFit,
            Some("pooling") => match lookup(ENV_SIZE_CLASSES) {
                Some(raw) => StrategyConfig::Pooling {
                    size_classes: parse_size_classes(&raw)?,
                },
                None => StrategyConfig::pooling_default(),
            },
            Some(other) => return Err(ConfigError::UnknownStrategy(other.to_string())),
        };

        let config = Self::new(total_size, strategy);
        config.validate()?;
        Ok(config)
    }
}

fn parse_size(key: &str, raw: &str) -> Result<Size, ConfigError> {
    raw.trim().parse::<Size>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn parse_size_classes(raw: &str) -> Result<Vec<Size>, ConfigError> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_size(ENV_SIZE_CLASSES, part))
        .collect()
}
