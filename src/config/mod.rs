//! Configuration layer for trmnl.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - The persisted configuration record ([`Config`], [`Plugin`])
//! - File persistence with legacy migration ([`ConfigStore`])
//! - Default values ([`defaults`])
//!
//! # Storage
//!
//! The configuration lives in `~/.trmnl/config.json` and is always read and
//! written as a whole. A `config.toml` left by early releases is converted on
//! the first load and then deleted.
//!
//! # Target Priority
//!
//! Webhook targets are resolved by the dispatcher with the following priority
//! (highest to lowest):
//!
//! 1. **Explicit URL** - `--webhook` on the command line
//! 2. **Environment** - the `TRMNL_WEBHOOK` variable
//! 3. **Named plugin** - `--plugin` on the command line
//! 4. **Default plugin** - `defaultPlugin` in the config
//! 5. **Only plugin** - when exactly one plugin exists and no default is set

mod cli;
pub mod defaults;
mod error;
mod record;
mod store;
mod toml;

#[cfg(test)]
mod store_tests;

pub use cli::{
    Cli, Command, ConfigAction, ContentArgs, HistoryAction, HistoryArgs, PluginAction, SendArgs,
    TierArg, ValidateArgs,
};
pub use error::ConfigError;
pub use record::{Config, HistorySettings, Plugin, PluginEntry, expand_tilde};
pub use store::ConfigStore;
pub use self::toml::LegacyConfig;
