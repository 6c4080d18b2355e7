//! Store configuration
//!
//! All sections have defaults, so a YAML file only needs the keys it
//! overrides:
//!
//! ```yaml
//! broadcast:
//!   slice_budget_ms: 8
//! resolver:
//!   cache_capacity: 256
//! reasoner:
//!   owl: false
//! ```

use crate::schema::InferenceRule;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML did not match the config schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Values that parse but cannot work together
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Change broadcasting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Time a single broadcast slice may run before yielding
    pub slice_budget_ms: u64,
    /// Yield once less than this much of the slice remains
    pub yield_threshold_ms: u64,
    /// Minimum interval between removals of cancelled subscribers
    pub cleanup_interval_ms: u64,
    /// Pending changes above which a broadcast is postponed
    pub postpone_threshold: usize,
    /// Length of one postponement
    pub postpone_step_ms: u64,
    /// Total postponement after which the broadcast runs regardless
    pub max_delay_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            slice_budget_ms: 16,
            yield_threshold_ms: 2,
            cleanup_interval_ms: 500,
            postpone_threshold: 2,
            postpone_step_ms: 200,
            max_delay_ms: 1000,
        }
    }
}

impl BroadcastConfig {
    pub fn slice_budget(&self) -> Duration {
        Duration::from_millis(self.slice_budget_ms)
    }

    pub fn yield_threshold(&self) -> Duration {
        Duration::from_millis(self.yield_threshold_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    pub fn postpone_step(&self) -> Duration {
        Duration::from_millis(self.postpone_step_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Handler resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Entries kept in the resolution cache
    pub cache_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
        }
    }
}

/// Schema reasoner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Enable the OWL processor
    pub owl: bool,
    /// Rules the processors apply
    pub rules: Vec<InferenceRule>,
    /// Write inferred statements into the store
    pub materialize: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            owl: true,
            rules: InferenceRule::all(),
            materialize: true,
        }
    }
}

/// Top-level store configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub broadcast: BroadcastConfig,
    pub resolver: ResolverConfig,
    pub reasoner: ReasonerConfig,
}

impl StoreConfig {
    /// Parse YAML, filling missing keys with defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: StoreConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let broadcast = &self.broadcast;
        if broadcast.slice_budget_ms == 0 {
            return Err(ConfigError::Invalid(
                "broadcast.slice_budget_ms must be positive".to_string(),
            ));
        }
        if broadcast.yield_threshold_ms >= broadcast.slice_budget_ms {
            return Err(ConfigError::Invalid(format!(
                "broadcast.yield_threshold_ms ({}) must be below slice_budget_ms ({})",
                broadcast.yield_threshold_ms, broadcast.slice_budget_ms
            )));
        }
        if self.resolver.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "resolver.cache_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
