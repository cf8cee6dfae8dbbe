//! The persisted configuration record and its mutations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::payload::Tier;

use super::{ConfigError, defaults};

/// A named webhook target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Webhook URL the payload is posted to.
    pub url: String,

    /// Free-form note shown in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Plugin {
    /// Creates a plugin with an optional description.
    #[must_use]
    pub fn new(url: impl Into<String>, description: Option<String>) -> Self {
        Self {
            url: url.into(),
            description,
        }
    }
}

/// History log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySettings {
    /// History file path; a leading `~` expands to the home directory.
    #[serde(default = "default_history_path")]
    pub path: String,

    /// Size in megabytes above which appends log a warning.
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
}

fn default_history_path() -> String {
    defaults::HISTORY_PATH.to_string()
}

const fn default_max_size_mb() -> u64 {
    defaults::HISTORY_MAX_SIZE_MB
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            path: default_history_path(),
            max_size_mb: default_max_size_mb(),
        }
    }
}

/// The whole configuration, read and written as one record.
///
/// Stored as `~/.trmnl/config.json`. Plugins are kept in name order, which
/// also decides which plugin becomes default after the default is removed.
///
/// A field that is null or has the wrong shape falls back to its own default
/// while the other fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Named webhook targets.
    #[serde(default, deserialize_with = "or_default")]
    pub plugins: BTreeMap<String, Plugin>,

    /// Name of the plugin used when none is given.
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_plugin: Option<String>,

    /// Account tier bounding payload size.
    #[serde(default, deserialize_with = "or_default")]
    pub tier: Tier,

    /// History log settings.
    #[serde(default, deserialize_with = "or_default")]
    pub history: HistorySettings,
}

/// Deserializes a field, using its default when the value is null or invalid.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        tracing::warn!("Invalid config field: {e}; using its default");
        T::default()
    }))
}

/// A plugin as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry<'a> {
    /// Plugin name.
    pub name: &'a str,
    /// Plugin target.
    pub plugin: &'a Plugin,
    /// Whether this is the default plugin.
    pub is_default: bool,
}

impl Config {
    /// Adds or replaces a plugin.
    ///
    /// The plugin becomes the default when no default is set yet or when it is
    /// the only plugin.
    pub fn set_plugin(&mut self, name: &str, url: &str, description: Option<String>) {
        self.plugins
            .insert(name.to_string(), Plugin::new(url, description));

        if self.default_plugin.is_none() || self.plugins.len() == 1 {
            self.default_plugin = Some(name.to_string());
        }
    }

    /// Updates an existing plugin in place.
    ///
    /// `url: None` keeps the current URL. `description: None` keeps the current
    /// description; `Some(None)` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PluginNotFound`] when no such plugin exists.
    pub fn update_plugin(
        &mut self,
        name: &str,
        url: Option<&str>,
        description: Option<Option<String>>,
    ) -> Result<(), ConfigError> {
        let plugin = self
            .plugins
            .get_mut(name)
            .ok_or_else(|| ConfigError::PluginNotFound(name.to_string()))?;
        if let Some(url) = url {
            plugin.url = url.to_string();
        }
        if let Some(description) = description {
            plugin.description = description;
        }
        Ok(())
    }

    /// Removes a plugin. Returns false if it did not exist.
    ///
    /// Removing the default promotes the first remaining plugin by name.
    pub fn remove_plugin(&mut self, name: &str) -> bool {
        if self.plugins.remove(name).is_none() {
            return false;
        }

        if self.default_plugin.as_deref() == Some(name) {
            self.default_plugin = self.plugins.keys().next().cloned();
        }
        true
    }

    /// Marks an existing plugin as default. Returns false if it does not exist.
    pub fn set_default_plugin(&mut self, name: &str) -> bool {
        if !self.plugins.contains_key(name) {
            return false;
        }
        self.default_plugin = Some(name.to_string());
        true
    }

    /// Lists plugins in name order with their default marker.
    #[must_use]
    pub fn plugin_entries(&self) -> Vec<PluginEntry<'_>> {
        self.plugins
            .iter()
            .map(|(name, plugin)| PluginEntry {
                name,
                plugin,
                is_default: self.default_plugin.as_deref() == Some(name.as_str()),
            })
            .collect()
    }

    /// Resolved history file path with `~` expanded.
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        expand_tilde(&self.history.path)
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading tilde, or when no home directory is known, are
/// returned unchanged.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(path),
    };

    dirs::home_dir().map_or_else(
        || PathBuf::from(path),
        |home| {
            let rest = rest.trim_start_matches(['/', '\\']);
            if rest.is_empty() {
                home
            } else {
                home.join(Path::new(rest))
            }
        },
    )
}
