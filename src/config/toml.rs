//! Legacy TOML configuration parsing.
//!
//! Early releases stored a single webhook in `~/.trmnl/config.toml`. The file
//! is converted into the JSON record once and then removed.

use serde::Deserialize;

use crate::payload::Tier;

use super::Config;
use super::defaults;

/// Root structure of the legacy `config.toml`.
///
/// Unknown sections are tolerated; only the webhook section carries data
/// worth migrating.
#[derive(Debug, Default, Deserialize)]
pub struct LegacyConfig {
    /// Webhook configuration section
    #[serde(default)]
    pub webhook: LegacyWebhookSection,
}

/// `[webhook]` section of the legacy file.
#[derive(Debug, Default, Deserialize)]
pub struct LegacyWebhookSection {
    /// Webhook URL
    pub url: Option<String>,

    /// Account tier
    pub tier: Option<Tier>,
}

impl LegacyConfig {
    /// Parses a legacy configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Converts into the current record.
    ///
    /// A non-empty URL becomes the plugin `default`, marked as default.
    #[must_use]
    pub fn into_config(self) -> Config {
        let mut config = Config {
            tier: self.webhook.tier.unwrap_or_default(),
            ..Config::default()
        };

        if let Some(url) = self.webhook.url.filter(|u| !u.trim().is_empty()) {
            config.set_plugin(defaults::LEGACY_PLUGIN_NAME, &url, None);
        }

        config
    }
}
