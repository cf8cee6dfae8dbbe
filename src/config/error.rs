//! Error types for configuration persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Only covers failures the caller must hear about. A missing or corrupt
/// config file is not an error; it loads as defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The user's home directory could not be determined.
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Failed to create the config directory.
    #[error("Failed to create config directory '{}': {source}", path.display())]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the configuration file.
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the configuration.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No plugin with the given name exists.
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),
}
