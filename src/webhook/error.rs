//! Error types for webhook operations.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong at the transport level. A response with a
/// non-success status is not an error here; the dispatcher interprets it.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// TLS failures and connections dropped mid-response.
    #[error("Connection error")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the given URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Why no webhook target could be chosen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// A plugin was requested by name but is not configured.
    #[error("Plugin not found: {name}")]
    PluginNotFound {
        /// Requested plugin name
        name: String,
    },

    /// No URL, no environment override and no plugins.
    #[error(
        "No webhook URL configured. Set TRMNL_WEBHOOK or run: trmnl plugin add <name> <url>"
    )]
    NoPluginsConfigured,

    /// Several plugins exist and none is marked default.
    #[error(
        "No default plugin set ({count} plugins configured). Use --plugin <name> or run: trmnl plugin default <name>"
    )]
    NoDefaultPlugin {
        /// Number of configured plugins
        count: usize,
    },

    /// The chosen URL does not parse.
    #[error("Invalid webhook URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Parser message
        reason: String,
    },
}
