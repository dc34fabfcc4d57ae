//! Configuration file loading and parsing.

use std::path::Path;

use super::model::FileConfig;
use crate::error::ConfigError;

/// Loads the configuration file from disk and parses it.
pub fn load_from_path(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: FileConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(path = %path.display(), "Loaded config file");

    Ok(config)
}
