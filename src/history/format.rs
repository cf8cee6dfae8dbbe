//! Text rendering of history entries.

use std::fmt::Display;

use chrono::{Local, TimeZone};

use crate::config::defaults;

use super::HistoryEntry;

/// Renders an entry as one line in local time.
///
/// See [`format_entry_in`].
#[must_use]
pub fn format_entry(entry: &HistoryEntry, verbose: bool) -> String {
    format_entry_in(entry, verbose, &Local)
}

/// Renders an entry as one line in the given time zone.
///
/// `✓ 2024-05-01 14:03:22 | home | 0.52 KB | 231ms`, with the error appended
/// to failed entries. In verbose mode a second line previews the first
/// characters of the `content` merge variable.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_entry_in<Tz>(entry: &HistoryEntry, verbose: bool, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let status = if entry.success { '✓' } else { '✗' };
    let time = entry.timestamp.with_timezone(tz).format("%Y-%m-%d %H:%M:%S");
    let size_kb = entry.size_bytes as f64 / 1024.0;

    let mut line = format!("{status} {time}");
    if let Some(plugin) = &entry.plugin {
        line.push_str(&format!(" | {plugin}"));
    }
    line.push_str(&format!(" | {size_kb:.2} KB | {}ms", entry.duration_ms));

    if !entry.success {
        if let Some(error) = &entry.error {
            line.push_str(&format!(" | {error}"));
        }
    }

    if verbose {
        if let Some(content) = entry.payload.content() {
            line.push_str(&format!("\n   {}", preview(content)));
        }
    }

    line
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(defaults::PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
