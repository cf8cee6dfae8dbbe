//! JSON Lines history file.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use super::{HistoryEntry, HistoryError, HistoryFilter, HistoryStats};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Append-only log of send attempts, one JSON object per line.
///
/// Reads are forgiving: a missing file is an empty log, and lines that fail
/// to parse (for example a torn write at the end) are skipped.
///
/// Appends go through a single `write` on a file opened in append mode. That
/// is atomic on most local filesystems, but concurrent invocations are not
/// otherwise coordinated.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
    max_size_bytes: Option<u64>,
}

impl HistoryLog {
    /// Creates a log backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size_bytes: None,
        }
    }

    /// Sets the size above which appends log a warning.
    #[must_use]
    pub const fn with_max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.max_size_bytes = Some(max_size_mb.saturating_mul(BYTES_PER_MB));
        self
    }

    /// Returns the path to the history file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a single line.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be serialized or the file cannot
    /// be written.
    pub fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(entry).map_err(HistoryError::Serialize)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
            }
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.write_error(e))?;

        self.warn_if_oversized(&file);
        Ok(())
    }

    /// Reads every parseable entry in file order.
    #[must_use]
    pub fn read_all(&self) -> Vec<HistoryEntry> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history {}: {e}", self.path.display());
                return Vec::new();
            }
        };

        String::from_utf8_lossy(&bytes)
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping history line {}: {e}", index + 1);
                    None
                }
            })
            .collect()
    }

    /// Reads, filters and sorts entries (newest first).
    #[must_use]
    pub fn query<Tz: TimeZone>(
        &self,
        filter: &HistoryFilter,
        now: &DateTime<Tz>,
    ) -> Vec<HistoryEntry> {
        filter.apply(self.read_all(), now)
    }

    /// Aggregate statistics, or `None` when there is no history file.
    #[must_use]
    pub fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<HistoryStats> {
        let file_size_bytes = std::fs::metadata(&self.path).ok()?.len();
        Some(HistoryStats::compute(
            &self.read_all(),
            file_size_bytes,
            now,
        ))
    }

    /// Deletes the history file.
    ///
    /// Returns `Ok(false)` if there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool, HistoryError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(HistoryError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Write {
            path: self.path.clone(),
            source,
        }
    }

    fn warn_if_oversized(&self, file: &std::fs::File) {
        let Some(max) = self.max_size_bytes else {
            return;
        };
        let size = file.metadata().map_or(0, |m| m.len());
        if size > max {
            tracing::warn!(
                "History file {} is {} MB (limit {} MB); run 'trmnl history clear'",
                self.path.display(),
                size / BYTES_PER_MB,
                max / BYTES_PER_MB
            );
        }
    }
}
