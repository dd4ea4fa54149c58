//! Engine configuration structures.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHAR_LENGTH, MAX_CHAR_LENGTH};
use crate::error::{KestrelError, KestrelResult};

/// Top-level engine configuration.
///
/// # Example
///
/// ```rust
/// use kestrel_common::config::EngineConfig;
///
/// let config = EngineConfig::from_toml_str("[planner]\nenable_predicate_pushdown = false\n").unwrap();
/// assert!(!config.planner.enable_predicate_pushdown);
/// assert_eq!(config.execution.max_result_rows, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Logical planner options.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Statement execution options.
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Column storage defaults.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging options.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Creates a configuration suited to tests: debug logging, no row cap.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                with_target: false,
            },
            ..Default::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> KestrelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text and validates it.
    pub fn from_toml_str(content: &str) -> KestrelResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| KestrelError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml(&self) -> KestrelResult<String> {
        toml::to_string_pretty(self).map_err(|e| KestrelError::invalid_config(e.to_string()))
    }

    /// Writes the configuration to a file.
    pub fn save(&self, path: &Path) -> KestrelResult<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> KestrelResult<()> {
        if self.storage.default_char_length == 0 {
            return Err(KestrelError::invalid_config(
                "storage.default_char_length must be at least 1",
            ));
        }

        if self.storage.max_char_length < self.storage.default_char_length {
            return Err(KestrelError::invalid_config(
                "storage.max_char_length must not be below default_char_length",
            ));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(KestrelError::invalid_config(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

/// Logical planner options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Push single-table comparisons against constants into table scans.
    /// Default: true
    #[serde(default = "default_true")]
    pub enable_predicate_pushdown: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            enable_predicate_pushdown: true,
        }
    }
}

/// Statement execution options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum rows collected into a result set; 0 means unlimited.
    /// Default: 0
    #[serde(default)]
    pub max_result_rows: usize,
}

/// Column storage defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Length given to CHARS columns declared without one.
    /// Default: 4
    #[serde(default = "default_char_length")]
    pub default_char_length: usize,

    /// Longest CHARS column that may be declared.
    /// Default: 65535
    #[serde(default = "default_max_char_length")]
    pub max_char_length: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_char_length: DEFAULT_CHAR_LENGTH,
            max_char_length: MAX_CHAR_LENGTH,
        }
    }
}

/// Logging options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    /// Default: "info"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Include the event target in log lines.
    /// Default: true
    #[serde(default = "default_true")]
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            with_target: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_char_length() -> usize {
    DEFAULT_CHAR_LENGTH
}

fn default_max_char_length() -> usize {
    MAX_CHAR_LENGTH
}

fn default_log_level() -> String {
    "info".to_string()
}
