//! Send history.
//!
//! Every dispatch attempt is appended to a JSON Lines file
//! (`~/.trmnl/history.jsonl` by default). This module provides:
//! - The entry record ([`HistoryEntry`])
//! - The file-backed log ([`HistoryLog`])
//! - Filtering and sorting ([`HistoryFilter`])
//! - Aggregates ([`HistoryStats`]) and text rendering ([`format_entry`])

mod entry;
mod filter;
mod format;
mod log;
mod stats;


pub use entry::HistoryEntry;
pub use filter::{HistoryFilter, parse_since, parse_until, start_of_day};
pub use format::{format_entry, format_entry_in};
pub use log::HistoryLog;
pub use stats::HistoryStats;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from history operations.
///
/// Only covers write-side failures and bad user input; read-side problems
/// degrade to an empty log.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Failed to append to the history file.
    #[error("Failed to write history file '{}': {source}", path.display())]
    Write {
        /// History file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to delete the history file.
    #[error("Failed to remove history file '{}': {source}", path.display())]
    Remove {
        /// History file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize an entry.
    #[error("Failed to serialize history entry: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A time bound could not be parsed.
    #[error("Invalid time '{0}': expected RFC 3339 (2024-05-01T12:00:00Z) or a date (2024-05-01)")]
    InvalidTime(String),
}
