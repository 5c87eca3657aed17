//! Access layer configuration.
//!
//! Every section has defaults, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "logging": { "file": "memento_log.txt", "level": "INFO", "enabled": true },
//!   "augment": { "empty_library": "reject" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::logging::{Severity, DEFAULT_LOG_FILE};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub logging: LoggingConfig,
    pub augment: AugmentConfig,
}

impl AccessConfig {
    pub fn from_json_str(json: &str) -> Result<Self, AccessError> {
        serde_json::from_str(json).map_err(|e| AccessError::Config {
            message: e.to_string(),
        })
    }

    /// Load a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AccessError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents).map_err(|e| match e {
            AccessError::Config { message } => AccessError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Where `BufferedLog::flush` appends.
    pub file: PathBuf,
    pub level: Severity,
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            level: Severity::Info,
            enabled: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    pub empty_library: EmptyLibraryPolicy,
}

/// What `Augmenter::materialize` does with a library that has no entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyLibraryPolicy {
    /// Fail with `AccessError::EmptyCollection`.
    #[default]
    Reject,
    /// Return an empty view.
    Allow,
}
