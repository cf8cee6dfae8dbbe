//! Webhook target resolution.

use url::Url;

use crate::config::{Config, defaults};

use super::TargetError;

/// A resolved webhook destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Name recorded in history: a plugin name, `$TRMNL_WEBHOOK` or `(direct)`.
    pub name: String,
    /// Parsed webhook URL.
    pub url: Url,
}

/// Picks the webhook target for one send.
///
/// Priority, highest first: `explicit_url`, `env_url`, the plugin named by
/// `plugin`, the configured default plugin, and finally the only plugin when
/// exactly one exists. Empty strings count as absent.
///
/// # Errors
///
/// Returns [`TargetError`] when the named plugin is unknown, when nothing is
/// configured, when several plugins exist without a default, or when the
/// chosen URL does not parse.
pub fn resolve_target(
    explicit_url: Option<&str>,
    env_url: Option<&str>,
    plugin: Option<&str>,
    config: &Config,
) -> Result<Target, TargetError> {
    let (name, url) = if let Some(url) = present(explicit_url) {
        (defaults::DIRECT_PLUGIN_NAME, url)
    } else if let Some(url) = present(env_url) {
        (defaults::ENV_PLUGIN_NAME, url)
    } else if let Some(name) = present(plugin) {
        let found = config
            .plugins
            .get_key_value(name)
            .ok_or_else(|| TargetError::PluginNotFound {
                name: name.to_string(),
            })?;
        (found.0.as_str(), found.1.url.as_str())
    } else {
        configured_default(config)?
    };

    let url = Url::parse(url.trim()).map_err(|e| TargetError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Target {
        name: name.to_string(),
        url,
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn configured_default(config: &Config) -> Result<(&str, &str), TargetError> {
    if let Some((name, plugin)) = config
        .default_plugin
        .as_deref()
        .and_then(|name| config.plugins.get_key_value(name))
    {
        return Ok((name, &plugin.url));
    }

    let mut plugins = config.plugins.iter();
    match (plugins.next(), plugins.next()) {
        (Some((name, plugin)), None) => Ok((name, &plugin.url)),
        (None, _) => Err(TargetError::NoPluginsConfigured),
        (Some(_), Some(_)) => Err(TargetError::NoDefaultPlugin {
            count: config.plugins.len(),
        }),
    }
}
