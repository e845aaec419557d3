//! Configuration system for seqrank.
//!
//! Load engine configuration from TOML or YAML files to control strict
//! validation, state pooling and suffix-range partitioning without code
//! changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use seqrank_config::{EngineConfig, ThreadCount, ValidationMode};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     validation = "strict"
//!
//!     [pool]
//!     capacity = 32
//!
//!     [partition]
//!     suffix_length = 3
//!     thread_count = { specific = 4 }
//! "#).unwrap();
//!
//! assert_eq!(config.validation, ValidationMode::Strict);
//! assert_eq!(config.pool.capacity, 32);
//! assert_eq!(config.partition.suffix_length, Some(3));
//! assert_eq!(config.partition.thread_count, ThreadCount::Specific(4));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use seqrank_config::EngineConfig;
//!
//! let config = EngineConfig::load("seqrank.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! assert!(!config.is_strict());
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Validation mode for every mutating engine operation.
    #[serde(default)]
    pub validation: ValidationMode,

    /// Sizes of the reusable state pools.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Suffix-range partitioning used by parallel sweeps.
    #[serde(default)]
    pub partition: PartitionConfig,
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.capacity == 0 {
            return Err(ConfigError::Invalid(
                "pool.capacity must be at least 1".to_string(),
            ));
        }
        if self.pool.scratch_capacity == 0 {
            return Err(ConfigError::Invalid(
                "pool.scratch_capacity must be at least 1".to_string(),
            ));
        }
        if self.partition.suffix_length == Some(0) {
            return Err(ConfigError::Invalid(
                "partition.suffix_length must be at least 1".to_string(),
            ));
        }
        if self.partition.thread_count == ThreadCount::Specific(0) {
            return Err(ConfigError::Invalid(
                "partition.thread_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the validation mode.
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    /// Sets the capacity of the caller-visible state pool.
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool.capacity = capacity;
        self
    }

    /// Sets the suffix length used to partition the rank space.
    pub fn with_suffix_length(mut self, suffix_length: usize) -> Self {
        self.partition.suffix_length = Some(suffix_length);
        self
    }

    /// Sets the worker thread count for parallel sweeps.
    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.partition.thread_count = thread_count;
        self
    }

    /// Returns true when every operation is cross-checked.
    pub fn is_strict(&self) -> bool {
        self.validation == ValidationMode::Strict
    }
}

/// Validation mode affecting engine checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// No cross-checking; production mode.
    #[default]
    Fast,

    /// Re-derives every intermediate result through an independent path and
    /// panics on the first mismatch. Debug use only.
    Strict,
}

/// Pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PoolConfig {
    /// Maximum number of idle caller-visible states kept for reuse.
    #[serde(default = "default_pool_capacity")]
    pub capacity: usize,

    /// Maximum number of idle internal scratch states kept for reuse.
    #[serde(default = "default_scratch_capacity")]
    pub scratch_capacity: usize,
}

fn default_pool_capacity() -> usize {
    16
}

fn default_scratch_capacity() -> usize {
    8
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_pool_capacity(),
            scratch_capacity: default_scratch_capacity(),
        }
    }
}

/// Suffix-range partitioning configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PartitionConfig {
    /// Number of most significant positions fixed per range.
    pub suffix_length: Option<usize>,

    /// Worker threads for parallel sweeps.
    #[serde(default)]
    pub thread_count: ThreadCount,
}

/// Thread count for parallel sweeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// Use the global rayon pool.
    #[default]
    Auto,

    /// Use a dedicated pool with exactly this many threads.
    Specific(usize),
}

impl ThreadCount {
    /// Resolves the thread count to an actual number.
    ///
    /// Never returns more threads than there are ranges to process.
    pub fn resolve(&self, range_count: usize) -> usize {
        match self {
            ThreadCount::Auto => {
                let cpus = std::thread::available_parallelism()
                    .map(|p| p.get())
                    .unwrap_or(1);
                cpus.min(range_count).max(1)
            }
            ThreadCount::Specific(n) => (*n).min(range_count).max(1),
        }
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "Auto"),
            ThreadCount::Specific(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_parsing() {
        let toml = r#"
            validation = "strict"

            [pool]
            capacity = 4
            scratch_capacity = 2

            [partition]
            suffix_length = 2
            thread_count = "auto"
        "#;

        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.pool.capacity, 4);
        assert_eq!(config.pool.scratch_capacity, 2);
        assert_eq!(config.partition.suffix_length, Some(2));
        assert_eq!(config.partition.thread_count, ThreadCount::Auto);
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
            validation: fast
            pool:
              capacity: 8
            partition:
              suffix_length: 3
              thread_count:
                specific: 2
        "#;

        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.validation, ValidationMode::Fast);
        assert_eq!(config.pool.capacity, 8);
        assert_eq!(config.pool.scratch_capacity, 8);
        assert_eq!(config.partition.thread_count, ThreadCount::Specific(2));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.pool.capacity, 16);
        assert!(!config.is_strict());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = EngineConfig::from_toml_str("[pool]\ncapacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_threads() {
        let config = EngineConfig::new().with_thread_count(ThreadCount::Specific(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/definitely/not/here/seqrank.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_validation(ValidationMode::Strict)
            .with_pool_capacity(3)
            .with_suffix_length(4)
            .with_thread_count(ThreadCount::Specific(2));

        assert!(config.is_strict());
        assert_eq!(config.pool.capacity, 3);
        assert_eq!(config.partition.suffix_length, Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thread_count_resolve() {
        assert_eq!(ThreadCount::Specific(8).resolve(3), 3);
        assert_eq!(ThreadCount::Specific(2).resolve(10), 2);
        assert_eq!(ThreadCount::Specific(2).resolve(0), 1);
        assert!(ThreadCount::Auto.resolve(100) >= 1);
        assert_eq!(ThreadCount::Specific(5).to_string(), "5");
    }
}
