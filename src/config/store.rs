//! File-based configuration persistence.

use std::io::ErrorKind;
use std::path::PathBuf;

use super::toml::LegacyConfig;
use super::{Config, ConfigError, defaults};

/// Reads and writes the [`Config`] record under a config directory.
///
/// Every access loads the whole record and every mutation saves the whole
/// record. There is no locking: two invocations mutating the config at the
/// same time race, and the last writer wins.
///
/// # Atomic Writes
///
/// Saves write to `config.json.tmp` and rename it over `config.json`, so a
/// crash mid-write never leaves a truncated file behind.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store at `~/.trmnl`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if the home directory is unknown.
    pub fn user_default() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(defaults::CONFIG_DIR_NAME)))
    }

    /// Path of the JSON config file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(defaults::CONFIG_FILE_NAME)
    }

    fn legacy_path(&self) -> PathBuf {
        self.dir.join(defaults::LEGACY_CONFIG_FILE_NAME)
    }

    /// Loads the configuration.
    ///
    /// Migrates a legacy `config.toml` first if one exists. A missing file
    /// yields defaults; an unreadable file or one that is not a JSON object
    /// yields defaults and logs a warning. A single bad field only resets that
    /// field.
    #[must_use]
    pub fn load(&self) -> Config {
        if let Some(config) = self.migrate_legacy() {
            return config;
        }

        let path = self.path();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Config::default(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}; using defaults", path.display());
                return Config::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Invalid config {}: {e}; using defaults", path.display());
            Config::default()
        })
    }

    /// Saves the whole configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(config)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| ConfigError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path();
        // Append .tmp instead of replacing the extension (config.json.tmp)
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
        let write_err = |source: std::io::Error| ConfigError::FileWrite {
            path: path.clone(),
            source,
        };

        std::fs::write(&temp_path, content).map_err(write_err)?;
        std::fs::rename(&temp_path, &path).map_err(write_err)?;

        Ok(())
    }

    /// Loads, mutates and saves the configuration in one step.
    ///
    /// The closure's return value is passed through. The config is saved even
    /// if the closure made no change.
    ///
    /// # Errors
    ///
    /// Returns an error if saving fails.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut Config) -> T) -> Result<T, ConfigError> {
        let mut config = self.load();
        let result = mutate(&mut config);
        self.save(&config)?;
        Ok(result)
    }

    /// Converts `config.toml` into `config.json`, once.
    ///
    /// Returns `None` when there is no legacy file, or when it cannot be read
    /// or parsed (the file is then left untouched).
    fn migrate_legacy(&self) -> Option<Config> {
        let legacy_path = self.legacy_path();
        let content = std::fs::read_to_string(&legacy_path).ok()?;

        let legacy = match LegacyConfig::parse(&content) {
            Ok(legacy) => legacy,
            Err(e) => {
                tracing::warn!("Ignoring unparseable {}: {e}", legacy_path.display());
                return None;
            }
        };

        let config = legacy.into_config();
        if let Err(e) = self.save(&config) {
            tracing::warn!("Failed to save migrated config: {e}");
            return None;
        }

        if let Err(e) = std::fs::remove_file(&legacy_path) {
            tracing::warn!("Failed to remove {}: {e}", legacy_path.display());
        }
        tracing::info!(
            "Migrated legacy {} to {}",
            defaults::LEGACY_CONFIG_FILE_NAME,
            defaults::CONFIG_FILE_NAME
        );

        Some(config)
    }
}
