//! Aggregate history statistics.

use std::fmt;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use super::{HistoryEntry, HistoryFilter};

/// Summary of a history file.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    /// Number of parseable entries.
    pub entries: usize,
    /// Successful sends.
    pub succeeded: usize,
    /// Failed sends.
    pub failed: usize,
    /// Rounded share of successful sends; `None` without entries.
    pub success_percent: Option<u32>,
    /// Rounded share of failed sends; `None` without entries.
    pub failed_percent: Option<u32>,
    /// Mean payload size, rounded.
    pub avg_size_bytes: u64,
    /// Mean duration, rounded.
    pub avg_duration_ms: u64,
    /// Size of the history file on disk.
    pub file_size_bytes: u64,
    /// Entries since local midnight.
    pub today: usize,
    /// Entries in the last seven days.
    pub this_week: usize,
}

impl HistoryStats {
    /// Computes statistics over `entries`.
    #[must_use]
    pub fn compute<Tz: TimeZone>(
        entries: &[HistoryEntry],
        file_size_bytes: u64,
        now: &DateTime<Tz>,
    ) -> Self {
        let total = entries.len();
        let succeeded = entries.iter().filter(|e| e.success).count();
        let failed = total - succeeded;

        let today = HistoryFilter {
            today: true,
            ..HistoryFilter::default()
        };
        let this_week = HistoryFilter {
            since: Some(now.with_timezone(&Utc) - TimeDelta::days(7)),
            ..HistoryFilter::default()
        };

        Self {
            entries: total,
            succeeded,
            failed,
            success_percent: percent(succeeded, total),
            failed_percent: percent(failed, total),
            avg_size_bytes: mean(entries.iter().map(|e| e.size_bytes as u64), total),
            avg_duration_ms: mean(entries.iter().map(|e| e.duration_ms), total),
            file_size_bytes,
            today: entries.iter().filter(|e| today.matches(e, now)).count(),
            this_week: entries.iter().filter(|e| this_week.matches(e, now)).count(),
        }
    }

    /// File size in megabytes, rounded to two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn file_size_mb(&self) -> f64 {
        (self.file_size_bytes as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percent(part: usize, total: usize) -> Option<u32> {
    (total > 0).then(|| (part as f64 / total as f64 * 100.0).round() as u32)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn mean(values: impl Iterator<Item = u64>, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let sum: u64 = values.sum();
    (sum as f64 / count as f64).round() as u64
}

fn with_percent(count: usize, percent: Option<u32>) -> String {
    percent.map_or_else(|| count.to_string(), |p| format!("{count} ({p}%)"))
}

impl fmt::Display for HistoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size:     {} MB", self.file_size_mb())?;
        writeln!(f)?;
        writeln!(f, "Total:    {} sends", self.entries)?;
        writeln!(
            f,
            "Success:  {}",
            with_percent(self.succeeded, self.success_percent)
        )?;
        writeln!(
            f,
            "Failed:   {}",
            with_percent(self.failed, self.failed_percent)
        )?;
        writeln!(f)?;
        writeln!(f, "Avg size:     {} bytes", self.avg_size_bytes)?;
        writeln!(f, "Avg duration: {}ms", self.avg_duration_ms)?;
        writeln!(f)?;
        writeln!(f, "Today:     {} sends", self.today)?;
        write!(f, "This week: {} sends", self.this_week)
    }
}
