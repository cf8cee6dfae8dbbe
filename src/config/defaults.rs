//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Payload limit of the free tier in bytes.
pub const FREE_LIMIT_BYTES: usize = 2048;

/// Payload limit of the plus tier in bytes.
pub const PLUS_LIMIT_BYTES: usize = 5120;

/// Directory under the user's home holding config and history.
pub const CONFIG_DIR_NAME: &str = ".trmnl";

/// JSON config file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Legacy TOML config file name, migrated on first load.
pub const LEGACY_CONFIG_FILE_NAME: &str = "config.toml";

/// Default history file location (tilde expanded at use).
pub const HISTORY_PATH: &str = "~/.trmnl/history.jsonl";

/// Default history size above which appends log a warning.
pub const HISTORY_MAX_SIZE_MB: u64 = 100;

/// Environment variable overriding every configured webhook target.
pub const WEBHOOK_ENV_VAR: &str = "TRMNL_WEBHOOK";

/// Plugin name recorded when the target came from [`WEBHOOK_ENV_VAR`].
pub const ENV_PLUGIN_NAME: &str = "$TRMNL_WEBHOOK";

/// Plugin name recorded when the caller passed an explicit URL.
pub const DIRECT_PLUGIN_NAME: &str = "(direct)";

/// Plugin name given to a URL migrated from the legacy TOML config.
pub const LEGACY_PLUGIN_NAME: &str = "default";

/// Default number of entries shown by `trmnl history`.
pub const HISTORY_LAST: usize = 10;

/// Characters of content shown in verbose history output.
pub const PREVIEW_CHARS: usize = 80;

/// Milliseconds to wait for the first chunk of piped stdin.
pub const STDIN_WAIT_MS: u64 = 100;

/// Wait for the first chunk of piped stdin as Duration.
#[must_use]
pub const fn stdin_wait() -> Duration {
    Duration::from_millis(STDIN_WAIT_MS)
}
