//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::payload::Tier;

use super::defaults;

/// trmnl: send content to TRMNL e-ink displays
///
/// Posts HTML or JSON payloads to TRMNL webhooks, checks them against the
/// account's size limit, and keeps a history of every send.
#[derive(Debug, Parser)]
#[command(name = "trmnl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (prints help when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Subcommands for trmnl
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send content to a TRMNL display
    Send(SendArgs),

    /// Validate a payload without sending it
    Validate(ValidateArgs),

    /// Show configuration, or change history settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Get or set the account tier (free or plus)
    Tier {
        /// New tier; shows the current tier when omitted
        value: Option<TierArg>,
    },

    /// Manage webhook plugins (lists plugins when no action is given)
    Plugin {
        #[command(subcommand)]
        action: Option<PluginAction>,
    },

    /// List all plugins
    Plugins,

    /// View send history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        #[command(flatten)]
        query: HistoryArgs,
    },
}

/// Where to read content from.
///
/// Inline content wins over a file; with neither, piped stdin is read.
#[derive(Debug, Clone, Default, Args)]
pub struct ContentArgs {
    /// HTML or JSON content
    #[arg(long, short)]
    pub content: Option<String>,

    /// Read content from a file
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

/// Arguments of `trmnl send`.
#[derive(Debug, Clone, Default, Args)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct SendArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Send to this URL instead of a configured plugin
    #[arg(long, short)]
    pub webhook: Option<String>,

    /// Send to this plugin instead of the default
    #[arg(long, short)]
    pub plugin: Option<String>,

    /// Send even if validation fails
    #[arg(long = "skip-validation")]
    pub skip_validation: bool,

    /// Do not record the send in history
    #[arg(long = "skip-log")]
    pub skip_log: bool,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `trmnl validate`.
#[derive(Debug, Clone, Default, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub content: ContentArgs,

    /// Override the configured tier
    #[arg(long, short, value_enum)]
    pub tier: Option<TierArg>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// `trmnl config` actions.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show or change history settings
    History {
        /// History file path (`~` expands to the home directory)
        #[arg(long)]
        path: Option<String>,

        /// Size in MB above which a warning is logged
        #[arg(long = "max-size-mb")]
        max_size_mb: Option<u64>,
    },
}

/// `trmnl plugin` actions.
#[derive(Debug, Clone, Subcommand)]
pub enum PluginAction {
    /// Add a plugin
    Add {
        /// Plugin name
        name: String,
        /// Webhook URL
        url: String,
        /// Plugin description
        #[arg(long = "desc", short)]
        description: Option<String>,
        /// Set as default plugin
        #[arg(long)]
        default: bool,
    },

    /// Remove a plugin
    #[command(visible_alias = "remove")]
    Rm {
        /// Plugin name
        name: String,
    },

    /// Set the default plugin
    Default {
        /// Plugin name
        name: String,
    },

    /// Update a plugin's URL or description
    #[command(visible_alias = "update")]
    Set {
        /// Plugin name
        name: String,
        /// New webhook URL
        #[arg(long, short)]
        url: Option<String>,
        /// New description (empty string clears it)
        #[arg(long = "desc", short)]
        description: Option<String>,
    },

    /// List all plugins
    List,
}

/// `trmnl history` actions.
#[derive(Debug, Clone, Subcommand)]
pub enum HistoryAction {
    /// Delete the history file
    Clear {
        /// Confirm deletion
        #[arg(long)]
        confirm: bool,
    },

    /// Show history statistics
    Stats,
}

/// Filters of `trmnl history`.
#[derive(Debug, Clone, Args)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct HistoryArgs {
    /// Show the last N entries
    #[arg(long, short = 'n', default_value_t = defaults::HISTORY_LAST)]
    pub last: usize,

    /// Show only today's entries
    #[arg(long)]
    pub today: bool,

    /// Show only failed sends
    #[arg(long)]
    pub failed: bool,

    /// Show only successful sends
    #[arg(long)]
    pub success: bool,

    /// Show entries at or after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Show entries at or before this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show a content preview
    #[arg(long, short)]
    pub verbose: bool,
}

/// Tier argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    /// 2 KB payload limit
    Free,
    /// 5 KB payload limit
    Plus,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Free => Self::Free,
            TierArg::Plus => Self::Plus,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, returning parse errors.
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }
}
