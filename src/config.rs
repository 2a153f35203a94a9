use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default number of undo snapshots retained per document.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default capacity of each remote sync queue.
pub const DEFAULT_SYNC_QUEUE_CAPACITY: usize = 256;

/// Engine-wide tunables.
///
/// Every field has a default, so an empty TOML document is a valid configuration:
///
/// ```toml
/// history_limit = 50
/// sync_queue_capacity = 256
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum length of a document's undo stack.
    pub history_limit: usize,
    /// Bounded capacity of the inbound and outbound sync queues.
    pub sync_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            sync_queue_capacity: DEFAULT_SYNC_QUEUE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // tokio's bounded channel panics on a zero capacity.
        if self.sync_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "sync_queue_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
